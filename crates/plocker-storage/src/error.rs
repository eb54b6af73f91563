//! Storage error types for plocker-storage.

use std::path::PathBuf;

use plocker_core::CoreError;
use thiserror::Error;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The file or directory does not exist.
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Reading or writing failed for a reason other than absence.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Decoding a manifest or registry blob failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl StorageError {
    /// Maps an `io::Error` for `path`, folding `NotFound` into its own variant.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound { path }
        } else {
            StorageError::Io { path, source }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}
