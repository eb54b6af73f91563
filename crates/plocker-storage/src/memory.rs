//! In-memory implementation of [`FileStore`].
//!
//! [`InMemoryFileStore`] is a first-class backend for tests and dry runs. It
//! keeps files in a `BTreeMap` keyed by relative path and can be told to
//! refuse writes to specific paths, which stands in for read-only files.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::StorageError;
use crate::traits::FileStore;

#[derive(Debug, Clone, Default)]
pub struct InMemoryFileStore {
    files: BTreeMap<PathBuf, Vec<u8>>,
    read_only: BTreeSet<PathBuf>,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`InMemoryFileStore::insert`].
    pub fn with_file(mut self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), bytes.into());
    }

    pub fn remove(&mut self, path: &Path) -> Option<Vec<u8>> {
        self.files.remove(path)
    }

    /// Makes every later `write` to `path` fail with `PermissionDenied`.
    pub fn set_read_only(&mut self, path: impl Into<PathBuf>) {
        self.read_only.insert(path.into());
    }

    /// Returns the file as UTF-8 text, if present.
    pub fn read_string(&self, path: &Path) -> Option<String> {
        self.files
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl FileStore for InMemoryFileStore {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                path: path.to_path_buf(),
            })
    }

    fn write(&mut self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        if self.read_only.contains(path) {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only file"),
            });
        }
        self.files.insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    fn list_dirs(&self, path: &Path) -> Result<Vec<String>, StorageError> {
        let mut dirs = BTreeSet::new();
        for file in self.files.keys() {
            let Ok(rest) = file.strip_prefix(path) else {
                continue;
            };
            let mut components = rest.components();
            // A direct child file is not a directory.
            if let (Some(Component::Normal(first)), Some(_)) =
                (components.next(), components.next())
            {
                dirs.insert(first.to_string_lossy().into_owned());
            }
        }
        Ok(dirs.into_iter().collect())
    }
}
