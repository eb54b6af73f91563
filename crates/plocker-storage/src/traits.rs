//! The [`FileStore`] trait: the narrow file access the locker needs from its
//! host.
//!
//! Paths are relative to the store's root (the vault base path), for example
//! `.obsidian/plugins/dataview/manifest.json`. The trait is synchronous; the
//! host dispatches one user action at a time, so nothing here is reentered.

use std::path::Path;

use crate::error::StorageError;

/// Read/write access to files under a vault root.
pub trait FileStore {
    /// Returns true if a file exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Reads the whole file.
    ///
    /// Returns [`StorageError::NotFound`] when the file does not exist.
    fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError>;

    /// Replaces the whole file, creating missing parent directories.
    fn write(&mut self, path: &Path, bytes: &[u8]) -> Result<(), StorageError>;

    /// Lists the names of the immediate subdirectories of `path`, sorted.
    ///
    /// A missing directory yields an empty list.
    fn list_dirs(&self, path: &Path) -> Result<Vec<String>, StorageError>;
}
