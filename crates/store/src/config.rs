//! Store configuration.

use crate::errors::{StoreError, StoreResult};

/// Limits applied to uploads.  Both are unlimited by default.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StoreConfig {
    /// Maximum number of files in one upload.
    max_files: Option<usize>,

    /// Maximum size of a single file, in bytes.
    max_file_len: Option<usize>,
}

impl StoreConfig {
    /// Constructs a config with no limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of files in one upload.
    pub fn with_max_files(mut self, max: usize) -> Self {
        self.max_files = Some(max);
        self
    }

    /// Sets the maximum size of a single file.
    pub fn with_max_file_len(mut self, max: usize) -> Self {
        self.max_file_len = Some(max);
        self
    }

    /// Maximum number of files in one upload, if limited.
    pub fn max_files(&self) -> Option<usize> {
        self.max_files
    }

    /// Maximum size of a single file, if limited.
    pub fn max_file_len(&self) -> Option<usize> {
        self.max_file_len
    }

    /// Checks an upload against the limits.
    pub fn check_upload<B: AsRef<[u8]>>(&self, files: &[B]) -> StoreResult<()> {
        if let Some(max) = self.max_files {
            if files.len() > max {
                return Err(StoreError::TooManyFiles {
                    count: files.len(),
                    max,
                });
            }
        }

        if let Some(max) = self.max_file_len {
            let oversized = files
                .iter()
                .map(|f| f.as_ref().len())
                .enumerate()
                .find(|(_, len)| *len > max);
            if let Some((index, len)) = oversized {
                return Err(StoreError::FileTooLarge { index, len, max });
            }
        }

        Ok(())
    }
}
