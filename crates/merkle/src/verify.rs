//! Proof verification.
//!
//! Verification needs no tree, only the published root, the file content, its
//! index, and the proof entries.  Starting from the leaf digest, each entry is
//! folded in on whichever side its range falls, mirroring how construction
//! always puts the left child's digest first.
//!
//! Errors are reserved for requests that make no sense (no root, index out of
//! range).  A proof that simply doesn't check out gives `Ok(false)`.

use crate::error::{MerkleError, MerkleResult};
use crate::hasher::MerkleHasher;
use crate::proof::ProofNode;
use crate::range::LeafRange;

/// Verifies that `leaf` is the file at `index` under `root_hash`, without
/// knowing how many files the batch has.
///
/// Every entry must cover a range adjacent to what has been accumulated so
/// far, and the final range must start at index 0.  An empty proof is only
/// checked by digest, as for a single-file batch.
pub fn verify_proof<MH: MerkleHasher>(
    root_hash: &str,
    leaf: &[u8],
    index: i64,
    proof: &[ProofNode],
) -> MerkleResult<bool> {
    if root_hash.is_empty() {
        return Err(MerkleError::EmptyRoot);
    }
    let idx = u64::try_from(index).map_err(|_| MerkleError::IndexOutOfBounds(index))?;
    verify_steps::<MH>(root_hash, leaf, idx, proof, None)
}

/// Verifies that `leaf` is the file at `index` under `root_hash` in a batch of
/// `num_leaves` files.
///
/// Like [`verify_proof`], but indexes past the end of the batch are an error
/// and the accumulated range must cover exactly `[0, num_leaves - 1]`.
pub fn verify_proof_with_len<MH: MerkleHasher>(
    root_hash: &str,
    num_leaves: u64,
    leaf: &[u8],
    index: i64,
    proof: &[ProofNode],
) -> MerkleResult<bool> {
    if root_hash.is_empty() || num_leaves == 0 {
        return Err(MerkleError::EmptyRoot);
    }
    let idx = u64::try_from(index)
        .ok()
        .filter(|i| *i < num_leaves)
        .ok_or(MerkleError::IndexOutOfBounds(index))?;
    verify_steps::<MH>(root_hash, leaf, idx, proof, Some(LeafRange::for_len(num_leaves)))
}

/// Folds `proof` into the digest of `leaf` and compares with `root_hash`.
///
/// If `full` is given the accumulated range must equal it, otherwise it only
/// has to start at 0.
pub(crate) fn verify_steps<MH: MerkleHasher>(
    root_hash: &str,
    leaf: &[u8],
    idx: u64,
    proof: &[ProofNode],
    full: Option<LeafRange>,
) -> MerkleResult<bool> {
    if root_hash.is_empty() {
        return Err(MerkleError::EmptyRoot);
    }

    let mut acc = MH::hash_leaf(leaf);
    let mut acc_range = LeafRange::single(idx);

    if proof.is_empty() {
        let covers = full.is_none_or(|full| full == acc_range);
        return Ok(covers && acc.eq_ct(root_hash));
    }

    for step in proof {
        let step_range = step.range();
        if !acc_range.is_adjacent(&step_range) {
            return Ok(false);
        }

        acc = if acc_range.is_left_of(&step_range) {
            MH::hash_node(&acc, step.digest())
        } else {
            MH::hash_node(step.digest(), &acc)
        };
        acc_range = acc_range.union(&step_range);
    }

    let covers = match full {
        Some(full) => acc_range == full,
        None => acc_range.start() == 0,
    };
    Ok(covers && acc.eq_ct(root_hash))
}
