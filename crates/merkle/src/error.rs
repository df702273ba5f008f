//! Error types.

use thiserror::Error;

use crate::hasher::HexDigest;

/// Errors from building trees, generating proofs, and verifying them.
///
/// A proof that is well-formed but fails the digest check is not an error,
/// verification returns `Ok(false)` for that.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    /// Tried to build a tree from zero files.
    #[error("no files provided to build a merkle tree from")]
    EmptyInput,

    /// Operation requires a tree but there is none.
    #[error("merkle tree is empty")]
    EmptyTree,

    /// Operation requires a root hash to check against but none was given.
    #[error("no merkle root to verify against")]
    EmptyRoot,

    /// A node handle did not resolve to a node.
    #[error("missing tree node (id {0})")]
    EmptyNode(usize),

    /// Leaf index outside of the tree's range.
    #[error("file index {0} is out of bounds")]
    IndexOutOfBounds(i64),

    /// Caller's root hash is not the root of the tree we hold.
    #[error("merkle root mismatch (expected {expected}, found {found})")]
    RootHashMismatch {
        /// Root of the tree actually held.
        expected: HexDigest,
        /// Root the caller supplied.
        found: String,
    },

    /// String is not a lowercase hex SHA-256 digest.
    #[error("invalid hex digest {0:?}")]
    InvalidDigest(String),

    /// Proof entry with an inverted range.
    #[error("malformed proof node range ({start}, {end})")]
    MalformedProofNode {
        /// Start of the range.
        start: u64,
        /// End of the range.
        end: u64,
    },
}

/// Wrapper result type.
pub type MerkleResult<T> = Result<T, MerkleError>;
