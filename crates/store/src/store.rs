//! The batch store.

use mguard_merkle::{
    HexDigest, MerkleError, MerkleHasher, MerkleProof, MerkleTree, ProofNode, Sha256Hasher,
};
use parking_lot::RwLock;
use tracing::*;

use crate::config::StoreConfig;
use crate::errors::StoreResult;

/// An uploaded batch and the tree built over it.
#[derive(Debug)]
struct Batch<MH> {
    files: Vec<Vec<u8>>,
    tree: MerkleTree<MH>,
}

impl<MH: MerkleHasher> Batch<MH> {
    fn file(&self, index: i64) -> Result<&[u8], MerkleError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.files.get(i))
            .map(Vec::as_slice)
            .ok_or(MerkleError::IndexOutOfBounds(index))
    }
}

/// Holds the active batch of files and answers download, proof, and
/// verification requests against it.
///
/// Each upload replaces the previous batch wholesale.  The new tree is built
/// before the store is locked, and readers never observe a batch whose tree
/// does not match its files.
#[derive(Debug)]
pub struct BatchStore<MH = Sha256Hasher> {
    config: StoreConfig,
    active: RwLock<Option<Batch<MH>>>,
}

impl<MH: MerkleHasher> BatchStore<MH> {
    /// Constructs an empty store.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            active: RwLock::new(None),
        }
    }

    /// Returns the store's config.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Runs `f` against the active batch, or fails with `missing` if nothing
    /// has been uploaded yet.
    fn with_batch<T>(
        &self,
        missing: MerkleError,
        f: impl FnOnce(&Batch<MH>) -> Result<T, MerkleError>,
    ) -> StoreResult<T> {
        let guard = self.active.read();
        let batch = guard.as_ref().ok_or(missing)?;
        Ok(f(batch)?)
    }

    /// Replaces the active batch with `files`, returning the new root digest.
    ///
    /// If the upload is rejected the previous batch stays active.
    pub fn upload(&self, files: Vec<Vec<u8>>) -> StoreResult<HexDigest> {
        let upload_span = debug_span!("upload", files = files.len());
        let _g = upload_span.enter();

        self.config
            .check_upload(&files)
            .inspect_err(|e| warn!(%e, "rejected upload"))?;
        let tree = MerkleTree::<MH>::from_files(&files)
            .inspect_err(|e| warn!(%e, "failed to build tree"))?;

        let root = tree.root_digest().clone();
        let prev = self.active.write().replace(Batch { files, tree });
        info!(%root, replaced = prev.is_some(), "activated new batch");

        Ok(root)
    }

    /// Returns the content of the file at `index`.
    pub fn download(&self, index: i64) -> StoreResult<Vec<u8>> {
        let span = debug_span!("download", %index);
        let _g = span.enter();

        self.with_batch(MerkleError::EmptyTree, |batch| {
            batch.file(index).map(<[u8]>::to_vec)
        })
        .inspect(|file| debug!(len = file.len(), "serving file"))
        .inspect_err(|e| warn!(%e, "download failed"))
    }

    /// Generates a proof for the file at `index`.
    pub fn get_proof(&self, index: i64) -> StoreResult<MerkleProof> {
        let span = debug_span!("get_proof", %index);
        let _g = span.enter();

        self.with_batch(MerkleError::EmptyTree, |batch| batch.tree.gen_proof(index))
            .inspect(|proof| debug!(steps = proof.steps().len(), "generated proof"))
            .inspect_err(|e| warn!(%e, "proof generation failed"))
    }

    /// Verifies the stored file at `index` against the caller's root hash and
    /// proof.
    ///
    /// Fails with `RootHashMismatch` if `root_hash` is not the active batch's
    /// root.
    pub fn verify_proof(
        &self,
        root_hash: &str,
        index: i64,
        proof: &[ProofNode],
    ) -> StoreResult<bool> {
        let span = debug_span!("verify_proof", %index, steps = proof.len());
        let _g = span.enter();

        self.with_batch(MerkleError::EmptyRoot, |batch| {
            // The tree checks the root before the index, and covers exactly
            // `files`, so a missing file is reported there.
            let file = batch.file(index).unwrap_or_default();
            batch.tree.verify_proof(root_hash, file, index, proof)
        })
        .inspect(|ok| debug!(%ok, "verified stored file"))
        .inspect_err(|e| warn!(%e, "verification request failed"))
    }

    /// Verifies caller-supplied `content` as the file at `index`.
    pub fn verify_content(
        &self,
        root_hash: &str,
        content: &[u8],
        index: i64,
        proof: &[ProofNode],
    ) -> StoreResult<bool> {
        let span = debug_span!("verify_content", %index, steps = proof.len());
        let _g = span.enter();

        self.with_batch(MerkleError::EmptyRoot, |batch| {
            batch.tree.verify_proof(root_hash, content, index, proof)
        })
        .inspect(|ok| debug!(%ok, "verified supplied content"))
        .inspect_err(|e| warn!(%e, "verification request failed"))
    }

    /// Returns the active batch's root digest.
    pub fn root_digest(&self) -> StoreResult<HexDigest> {
        self.with_batch(MerkleError::EmptyTree, |batch| {
            Ok(batch.tree.root_digest().clone())
        })
    }

    /// Returns the number of files in the active batch, 0 if none.
    pub fn len(&self) -> usize {
        self.active.read().as_ref().map_or(0, |b| b.files.len())
    }

    /// Returns if there is no active batch.
    pub fn is_empty(&self) -> bool {
        self.active.read().is_none()
    }
}

impl<MH: MerkleHasher> Default for BatchStore<MH> {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}
