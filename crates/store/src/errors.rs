use mguard_merkle::MerkleError;
use thiserror::Error;

/// Errors from the batch store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Upload has more files than the configured limit.
    #[error("batch of {count} files exceeds limit of {max}")]
    TooManyFiles {
        /// Files in the rejected upload.
        count: usize,
        /// Configured limit.
        max: usize,
    },

    /// A single file is larger than the configured limit.
    #[error("file {index} is {len} bytes, limit is {max}")]
    FileTooLarge {
        /// Position of the file in the upload.
        index: usize,
        /// Size of the file.
        len: usize,
        /// Configured limit.
        max: usize,
    },

    /// Error from the underlying tree.
    #[error("merkle: {0}")]
    Merkle(#[from] MerkleError),
}

/// Wrapper result type.
pub type StoreResult<T> = Result<T, StoreError>;
