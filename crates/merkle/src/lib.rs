//! Merkle commitments over ordered file batches.
//!
//! A batch of files is committed to by a single root digest.  Any file can
//! later be shown to be the one at a given position under that root with a
//! proof of `O(log n)` sibling digests.
//!
//! ```rust
//! use mguard_merkle::{Sha256Hasher, Sha256MerkleTree, verify::verify_proof};
//!
//! let files = ["A", "B", "C", "D", "E"];
//! let tree = Sha256MerkleTree::from_files(&files)?;
//! let root = tree.root_digest().clone();
//!
//! let proof = tree.gen_proof(4)?;
//! assert_eq!(proof.ranges(), vec![(3, 3), (0, 2)]);
//! assert!(verify_proof::<Sha256Hasher>(root.as_str(), b"E", 4, proof.steps())?);
//! # Ok::<(), mguard_merkle::MerkleError>(())
//! ```
//!
//! # Modules
//!
//! - `hasher`: hex digest type and hashing strategies
//! - `range`: inclusive leaf index ranges
//! - `tree`: tree construction, inspection, and proof generation
//! - `proof`: proof value types
//! - `verify`: tree-less proof verification

// stupid linter issue
#[cfg(test)]
use criterion as _;

#[cfg(feature = "borsh")]
mod borsh_impl;
pub mod error;
pub mod hasher;
pub mod proof;
pub mod range;
#[cfg(feature = "serde")]
mod serde_impl;
pub mod tree;
pub mod verify;

// Test-only dependency used in serde roundtrip tests when the `serde` feature
// is disabled, to satisfy unused dependency lint for dev-deps.
#[cfg(all(test, not(feature = "serde")))]
use bincode as _;
#[cfg(all(test, not(feature = "serde")))]
use serde_json as _;

// Common re-exports for ergonomic access at the crate root.
pub use error::{MerkleError, MerkleResult};
pub use hasher::{
    DIGEST_HEX_LEN, DigestHexHasher, HexDigest, MerkleHasher, Sha256Hasher, sha256_hex,
};
pub use proof::{MerkleProof, ProofNode, RawMerkleProof};
pub use range::LeafRange;
pub use tree::{MerkleTree, Node, NodeId, Sha256MerkleTree};
pub use verify::{verify_proof, verify_proof_with_len};
