//! Range-annotated binary Merkle tree over an ordered batch of files.
//!
//! Unlike a classic power-of-two tree, any number of files is accepted: the
//! index range `[0, n - 1]` is split at its midpoint recursively, so the shape
//! is fully determined by `n`.  Every node remembers the range it covers, and
//! proofs carry those ranges so a verifier can work out concatenation order
//! without knowing the tree shape.
use std::fmt;
use std::marker::PhantomData;

use crate::error::{MerkleError, MerkleResult};
use crate::hasher::{HexDigest, MerkleHasher, Sha256Hasher};
use crate::proof::{MerkleProof, ProofNode};
use crate::range::LeafRange;
use crate::verify;

/// Handle of a node within a [`MerkleTree`].
pub type NodeId = usize;

/// Node in the tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Node {
    digest: HexDigest,
    range: LeafRange,
    children: Option<(NodeId, NodeId)>,
    parent: Option<NodeId>,
}

impl Node {
    /// Digest committing to every file in the node's range.
    pub fn digest(&self) -> &HexDigest {
        &self.digest
    }

    /// Leaf range covered by the node.
    pub fn range(&self) -> LeafRange {
        self.range
    }

    /// Left and right children, or `None` for a leaf.
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        self.children
    }

    /// Parent of the node, or `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns if the node is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Immutable Merkle tree, backed by a node arena.
///
/// Nodes are stored in post-order, children before parents, so the root is
/// always the last node.  Parent links are kept as handles, which makes
/// walking from a leaf to the root `O(log n)`.
#[derive(Clone, Debug)]
pub struct MerkleTree<MH = Sha256Hasher> {
    nodes: Vec<Node>,
    _hasher: PhantomData<fn() -> MH>,
}

/// Tree hashed with SHA-256.
pub type Sha256MerkleTree = MerkleTree<Sha256Hasher>;

impl<MH: MerkleHasher> MerkleTree<MH> {
    /// Builds a tree over an ordered list of files.
    ///
    /// Returns `Err(MerkleError::EmptyInput)` if `files` is empty.
    pub fn from_files<B: AsRef<[u8]>>(files: &[B]) -> MerkleResult<Self> {
        if files.is_empty() {
            return Err(MerkleError::EmptyInput);
        }

        let total = 2 * files.len() - 1;
        let mut nodes = Vec::with_capacity(total);
        build_range::<MH, B>(files, LeafRange::for_len(files.len() as u64), &mut nodes);
        debug_assert_eq!(nodes.len(), total);

        Ok(Self {
            nodes,
            _hasher: PhantomData,
        })
    }

    /// Returns the root node.
    pub fn root(&self) -> &Node {
        // Construction rejects empty input, so there is always a root.
        &self.nodes[self.root_id()]
    }

    fn root_id(&self) -> NodeId {
        self.nodes.len() - 1
    }

    /// Returns the root digest, the commitment to the whole batch.
    pub fn root_digest(&self) -> &HexDigest {
        &self.root().digest
    }

    /// Looks up a node by handle.
    pub fn node(&self, id: NodeId) -> MerkleResult<&Node> {
        self.nodes.get(id).ok_or(MerkleError::EmptyNode(id))
    }

    /// Returns the number of files the tree was built over.
    pub fn num_leaves(&self) -> u64 {
        self.root().range.len()
    }

    /// Returns the total number of nodes, always `2 * num_leaves - 1`.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of levels from the root down to the deepest leaf.
    /// A single-file tree has height 1.
    pub fn height(&self) -> usize {
        // Splits are left-heavy, so the leftmost path is always a longest one.
        let mut height = 1;
        let mut cur = self.root();
        while let Some((left, _)) = cur.children {
            height += 1;
            cur = &self.nodes[left];
        }
        height
    }

    /// Finds the leaf for a file index by descending with the same midpoint
    /// rule used during construction.
    pub fn leaf(&self, index: i64) -> MerkleResult<&Node> {
        let id = self.find_leaf(index)?;
        self.node(id)
    }

    fn find_leaf(&self, index: i64) -> MerkleResult<NodeId> {
        let root = self.root();
        let idx = u64::try_from(index)
            .ok()
            .filter(|i| root.range.contains(*i))
            .ok_or(MerkleError::IndexOutOfBounds(index))?;

        let mut cur = self.root_id();
        loop {
            let node = self.node(cur)?;
            match node.children {
                None => return Ok(cur),
                Some((left, right)) => {
                    cur = if idx <= node.range.midpoint() {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Generates an inclusion proof for the file at `index`.
    ///
    /// The first entry is the leaf's sibling, each following entry is the
    /// sibling of the next ancestor up.  A single-file tree yields an empty
    /// proof.
    pub fn gen_proof(&self, index: i64) -> MerkleResult<MerkleProof> {
        let leaf = self.find_leaf(index)?;
        let mut path = Vec::with_capacity(self.height() - 1);

        let mut cur = leaf;
        while let Some(parent) = self.node(cur)?.parent {
            let (left, right) = self
                .node(parent)?
                .children
                .ok_or(MerkleError::EmptyNode(parent))?;
            let sibling = if left == cur { right } else { left };
            path.push(ProofNode::from(self.node(sibling)?));
            cur = parent;
        }

        let leaf_idx = self.node(leaf)?.range.start();
        Ok(MerkleProof::from_steps(path, leaf_idx))
    }

    /// Verifies `leaf` at `index` against a root hash, using this tree only to
    /// check that the root hash and index make sense.
    ///
    /// Returns `Err(MerkleError::RootHashMismatch)` if `root_hash` is not this
    /// tree's root, so a caller asking about some other batch is told so
    /// instead of getting a plain `false`.
    pub fn verify_proof(
        &self,
        root_hash: &str,
        leaf: &[u8],
        index: i64,
        proof: &[ProofNode],
    ) -> MerkleResult<bool> {
        if root_hash.is_empty() {
            return Err(MerkleError::EmptyRoot);
        }

        let root = self.root_digest();
        if !root.eq_ct(root_hash) {
            return Err(MerkleError::RootHashMismatch {
                expected: root.clone(),
                found: root_hash.to_owned(),
            });
        }

        verify::verify_proof_with_len::<MH>(root_hash, self.num_leaves(), leaf, index, proof)
    }

    /// Returns a [`fmt::Display`] adapter that renders the tree as an outline.
    pub fn display(&self) -> TreeDisplay<'_, MH> {
        TreeDisplay { tree: self }
    }
}

/// Recursively builds the subtree over `range`, pushing nodes in post-order.
/// Returns the handle of the subtree's root.
fn build_range<MH: MerkleHasher, B: AsRef<[u8]>>(
    files: &[B],
    range: LeafRange,
    nodes: &mut Vec<Node>,
) -> NodeId {
    let node = match range.split() {
        None => Node {
            digest: MH::hash_leaf(files[range.start() as usize].as_ref()),
            range,
            children: None,
            parent: None,
        },
        Some((left_range, right_range)) => {
            let left = build_range::<MH, B>(files, left_range, nodes);
            let right = build_range::<MH, B>(files, right_range, nodes);
            Node {
                digest: MH::hash_node(&nodes[left].digest, &nodes[right].digest),
                range,
                children: Some((left, right)),
                parent: None,
            }
        }
    };

    let id = nodes.len();
    if let Some((left, right)) = node.children {
        nodes[left].parent = Some(id);
        nodes[right].parent = Some(id);
    }
    nodes.push(node);
    id
}

/// Outline rendering of a [`MerkleTree`], one node per line.
#[derive(Debug)]
pub struct TreeDisplay<'t, MH> {
    tree: &'t MerkleTree<MH>,
}

impl<MH: MerkleHasher> TreeDisplay<'_, MH> {
    fn write_children(
        &self,
        f: &mut fmt::Formatter<'_>,
        id: NodeId,
        prefix: &str,
    ) -> fmt::Result {
        let node = self.tree.node(id).map_err(|_| fmt::Error)?;
        let Some((left, right)) = node.children else {
            return Ok(());
        };

        for (child, branch, cont) in [(left, "├── L", "│   "), (right, "└── R", "    ")] {
            let c = self.tree.node(child).map_err(|_| fmt::Error)?;
            writeln!(f, "{prefix}{branch} {} {}", c.range, c.digest)?;
            self.write_children(f, child, &format!("{prefix}{cont}"))?;
        }

        Ok(())
    }
}

impl<MH: MerkleHasher> fmt::Display for TreeDisplay<'_, MH> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = self.tree.root();
        writeln!(
            f,
            "merkle tree: {} nodes, height {}",
            self.tree.num_nodes(),
            self.tree.height()
        )?;
        writeln!(f, "{} {}", root.range, root.digest)?;
        self.write_children(f, self.tree.root_id(), "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::sha256_hex;

    type H = Sha256Hasher;

    fn files(names: &str) -> Vec<Vec<u8>> {
        names.bytes().map(|b| vec![b]).collect()
    }

    fn proof_ranges(tree: &Sha256MerkleTree, index: i64) -> Vec<(u64, u64)> {
        tree.gen_proof(index).unwrap().ranges()
    }

    #[test]
    fn empty_input_rejected() {
        let empty: Vec<Vec<u8>> = Vec::new();
        let err = Sha256MerkleTree::from_files(&empty).unwrap_err();
        assert_eq!(err, MerkleError::EmptyInput);
    }

    #[test]
    fn single_file_tree() {
        let tree = Sha256MerkleTree::from_files(&files("A")).unwrap();
        assert!(tree.root().is_leaf());
        assert_eq!(tree.root_digest(), &sha256_hex(b"A"));
        assert_eq!(tree.num_nodes(), 1);
        assert_eq!(tree.height(), 1);

        let proof = tree.gen_proof(0).unwrap();
        assert!(proof.steps().is_empty());
        let root = tree.root_digest().as_str();
        assert!(tree.verify_proof(root, b"A", 0, proof.steps()).unwrap());
    }

    #[test]
    fn test_nodes_four() {
        let a = H::hash_leaf(b"A");
        let b = H::hash_leaf(b"B");
        let c = H::hash_leaf(b"C");
        let d = H::hash_leaf(b"D");
        let ab = H::hash_node(&a, &b);
        let cd = H::hash_node(&c, &d);
        let abcd = H::hash_node(&ab, &cd);

        let tree = Sha256MerkleTree::from_files(&files("ABCD")).unwrap();
        let digests: Vec<_> = tree.nodes.iter().map(|n| n.digest.clone()).collect();
        assert_eq!(digests, vec![a, b, ab, c, d, cd, abcd]);
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn test_nodes_five_left_heavy() {
        let [a, b, c, d, e] = [b"A", b"B", b"C", b"D", b"E"].map(|x| H::hash_leaf(x));
        let ab = H::hash_node(&a, &b);
        let abc = H::hash_node(&ab, &c);
        let de = H::hash_node(&d, &e);
        let root = H::hash_node(&abc, &de);

        let tree = Sha256MerkleTree::from_files(&files("ABCDE")).unwrap();
        assert_eq!(tree.root_digest(), &root);

        let (left, right) = tree.root().children().unwrap();
        assert_eq!(tree.node(left).unwrap().range().as_tuple(), (0, 2));
        assert_eq!(tree.node(right).unwrap().range().as_tuple(), (3, 4));
        assert_eq!(tree.num_nodes(), 9);
        assert_eq!(tree.height(), 4);
    }

    #[test]
    fn parent_links_consistent() {
        let tree = Sha256MerkleTree::from_files(&files("ABCDEFGHIJK")).unwrap();
        assert_eq!(tree.root().parent(), None);
        for (id, node) in tree.nodes.iter().enumerate() {
            if let Some((l, r)) = node.children() {
                let left = tree.node(l).unwrap();
                let right = tree.node(r).unwrap();
                assert_eq!(left.parent(), Some(id));
                assert_eq!(right.parent(), Some(id));
                assert_eq!(left.range().end() + 1, right.range().start());
                assert_eq!(node.range(), left.range().union(&right.range()));
                assert_eq!(node.digest(), &H::hash_node(left.digest(), right.digest()));
            } else {
                assert!(node.range().is_single());
            }
        }
    }

    #[test]
    fn proof_ranges_five() {
        let tree = Sha256MerkleTree::from_files(&files("ABCDE")).unwrap();
        let all: Vec<_> = (0..5).map(|i| proof_ranges(&tree, i)).collect();
        assert_eq!(
            all,
            vec![
                vec![(1, 1), (2, 2), (3, 4)],
                vec![(0, 0), (2, 2), (3, 4)],
                vec![(0, 1), (3, 4)],
                vec![(4, 4), (0, 2)],
                vec![(3, 3), (0, 2)],
            ]
        );
    }

    #[test]
    fn proof_out_of_bounds() {
        let tree = Sha256MerkleTree::from_files(&files("ABCDE")).unwrap();
        assert_eq!(
            tree.gen_proof(-1).unwrap_err(),
            MerkleError::IndexOutOfBounds(-1)
        );
        assert_eq!(
            tree.gen_proof(5).unwrap_err(),
            MerkleError::IndexOutOfBounds(5)
        );
        assert_eq!(
            tree.leaf(i64::MIN).unwrap_err(),
            MerkleError::IndexOutOfBounds(i64::MIN)
        );
    }

    #[test]
    fn leaf_lookup() {
        let tree = Sha256MerkleTree::from_files(&files("ABCDEFG")).unwrap();
        for (i, b) in "ABCDEFG".bytes().enumerate() {
            let leaf = tree.leaf(i as i64).unwrap();
            assert!(leaf.is_leaf());
            assert_eq!(leaf.range(), LeafRange::single(i as u64));
            assert_eq!(leaf.digest(), &sha256_hex(&[b]));
        }
    }

    #[test]
    fn verify_against_wrong_root() {
        let tree = Sha256MerkleTree::from_files(&files("ABCD")).unwrap();
        let proof = tree.gen_proof(1).unwrap();
        let other = sha256_hex(b"other");

        let err = tree.verify_proof(other.as_str(), b"B", 1, proof.steps()).unwrap_err();
        assert_eq!(
            err,
            MerkleError::RootHashMismatch {
                expected: tree.root_digest().clone(),
                found: other.into_string(),
            }
        );
        assert_eq!(
            tree.verify_proof("", b"B", 1, proof.steps()).unwrap_err(),
            MerkleError::EmptyRoot
        );
        assert_eq!(
            tree.verify_proof(tree.root_digest().as_str(), b"B", 4, proof.steps())
                .unwrap_err(),
            MerkleError::IndexOutOfBounds(4)
        );
    }

    #[test]
    fn display_outline() {
        let tree = Sha256MerkleTree::from_files(&files("ABC")).unwrap();
        let out = tree.display().to_string();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 1 + tree.num_nodes());
        assert_eq!(lines[0], "merkle tree: 5 nodes, height 3");
        assert!(lines[1].starts_with("(0, 2) "));
        assert!(lines[2].starts_with("├── L (0, 1) "));
        assert!(lines[3].starts_with("│   ├── L (0, 0) "));
        assert!(lines[4].starts_with("│   └── R (1, 1) "));
        assert!(lines[5].starts_with("└── R (2, 2) "));
        assert!(lines[5].ends_with(sha256_hex(b"C").as_str()));
    }
}
