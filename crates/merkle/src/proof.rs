//! Proof types produced by the tree and consumed by verification.

use crate::error::MerkleResult;
use crate::hasher::{HexDigest, MerkleHasher};
use crate::range::LeafRange;
use crate::tree::Node;
use crate::verify;

/// One entry of a proof: a sibling node's digest and the range it covers.
///
/// The range is what tells the verifier which side of the concatenation the
/// digest goes on.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ProofNode {
    pub(crate) digest: HexDigest,
    pub(crate) range: LeafRange,
}

impl ProofNode {
    /// Constructs a new entry.
    pub fn new(digest: HexDigest, range: LeafRange) -> Self {
        Self { digest, range }
    }

    /// Constructs a new entry from raw parts, as received over the wire.
    pub fn from_parts(digest: &str, start: u64, end: u64) -> MerkleResult<Self> {
        Ok(Self {
            digest: digest.parse()?,
            range: LeafRange::new(start, end)?,
        })
    }

    /// Digest of the sibling node.
    pub fn digest(&self) -> &HexDigest {
        &self.digest
    }

    /// Range covered by the sibling node.
    pub fn range(&self) -> LeafRange {
        self.range
    }
}

impl From<&Node> for ProofNode {
    fn from(node: &Node) -> Self {
        Self::new(node.digest().clone(), node.range())
    }
}

/// Proof for a file at some position.
///
/// Proofs are snapshots and stay valid for as long as the batch they were
/// generated from is the one being verified against.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct MerkleProof {
    /// Sibling entries required for proof.
    pub(crate) inner: RawMerkleProof,

    /// Index of the file this proof is for.
    pub(crate) index: u64,
}

impl MerkleProof {
    pub(crate) fn new(inner: RawMerkleProof, index: u64) -> Self {
        Self { inner, index }
    }

    /// Constructs a new instance from the path.
    pub fn from_steps(steps: Vec<ProofNode>, index: u64) -> Self {
        Self::new(RawMerkleProof::new(steps), index)
    }

    /// Exposes the raw inner proof.
    pub fn inner_raw(&self) -> &RawMerkleProof {
        &self.inner
    }

    /// Returns the entries, ordered from the leaf's sibling upwards.
    pub fn steps(&self) -> &[ProofNode] {
        self.inner.steps()
    }

    /// Returns the index this proof is for.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Returns the `(start, end)` ranges of the entries, in order.
    pub fn ranges(&self) -> Vec<(u64, u64)> {
        self.steps().iter().map(|s| s.range.as_tuple()).collect()
    }

    /// Discards the index and returns the raw proof.
    pub fn into_raw(self) -> RawMerkleProof {
        self.inner
    }

    /// Verifies this proof for the file content `leaf` against `root`,
    /// without knowing the size of the batch.
    ///
    /// See [`verify::verify_proof`] for the rules applied.
    pub fn verify_with_root<MH: MerkleHasher>(
        &self,
        root: &str,
        leaf: &[u8],
    ) -> MerkleResult<bool> {
        verify::verify_steps::<MH>(root, leaf, self.index, self.steps(), None)
    }
}

/// Raw proof for some file.
///
/// This doesn't include the index of the file being proven, which makes this
/// useful in contexts where we establish that value separately.
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct RawMerkleProof {
    pub(crate) steps: Vec<ProofNode>,
}

impl RawMerkleProof {
    /// Creates a new raw proof from a path.
    pub fn new(steps: Vec<ProofNode>) -> Self {
        Self { steps }
    }

    /// Creates an empty raw proof, as produced for single-file batches.
    pub fn new_empty() -> Self {
        Self::default()
    }

    /// Returns the entries in this proof.
    pub fn steps(&self) -> &[ProofNode] {
        &self.steps
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Takes an index that this proof is allegedly for and constructs a full
    /// proof using the path we have.
    pub fn into_indexed(self, idx: u64) -> MerkleProof {
        MerkleProof::new(self, idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MerkleError;
    use crate::hasher::{Sha256Hasher, sha256_hex};
    use crate::tree::Sha256MerkleTree;

    #[test]
    fn from_parts_validates() {
        let d = sha256_hex(b"A");
        let node = ProofNode::from_parts(d.as_str(), 1, 3).unwrap();
        assert_eq!(node.digest(), &d);
        assert_eq!(node.range().as_tuple(), (1, 3));

        assert_eq!(
            ProofNode::from_parts(d.as_str(), 3, 1).unwrap_err(),
            MerkleError::MalformedProofNode { start: 3, end: 1 }
        );
        assert!(matches!(
            ProofNode::from_parts("not hex", 0, 0),
            Err(MerkleError::InvalidDigest(_))
        ));
        assert!(matches!(
            ProofNode::from_parts(&d.as_str()[..62], 0, 0),
            Err(MerkleError::InvalidDigest(_))
        ));
    }

    #[test]
    fn raw_reindex() {
        let files = [b"A", b"B", b"C"];
        let tree = Sha256MerkleTree::from_files(&files).unwrap();
        let proof = tree.gen_proof(2).unwrap();
        assert_eq!(proof.index(), 2);
        assert_eq!(proof.inner_raw().len(), 1);

        let root = tree.root_digest().as_str();
        let raw = proof.clone().into_raw();
        assert_eq!(raw.clone().into_indexed(2), proof);
        let good = raw.clone().into_indexed(2);
        assert!(good.verify_with_root::<Sha256Hasher>(root, b"C").unwrap());
        let shifted = raw.into_indexed(1);
        assert!(!shifted.verify_with_root::<Sha256Hasher>(root, b"C").unwrap());
    }

    #[test]
    fn empty_raw_proof() {
        let raw = RawMerkleProof::new_empty();
        assert!(raw.is_empty());
        let proof = raw.into_indexed(0);
        let root = sha256_hex(b"only");
        assert!(proof.verify_with_root::<Sha256Hasher>(root.as_str(), b"only").unwrap());
        assert!(!proof.verify_with_root::<Sha256Hasher>(root.as_str(), b"other").unwrap());
    }
}
