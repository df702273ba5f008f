//! Service layer for Merkle-committed file batches.
//!
//! A [`BatchStore`] holds the most recently uploaded batch of files together
//! with the tree built over it, and serves the operations an RPC front end
//! exposes: upload, download, proof generation, and proof verification.
//! Transport and request decoding are left to the caller; errors from this
//! crate are meant to be mapped onto transport status codes.

mod config;
mod errors;
mod store;

// Dev-dependencies only exercised by some feature combinations.
#[cfg(test)]
use proptest as _;
#[cfg(all(test, not(feature = "serde")))]
use serde_json as _;

pub use config::StoreConfig;
pub use errors::{StoreError, StoreResult};
pub use store::BatchStore;
