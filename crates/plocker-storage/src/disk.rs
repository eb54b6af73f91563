//! Filesystem implementation of [`FileStore`] rooted at a vault directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::StorageError;
use crate::traits::FileStore;

/// Files under a vault's base path.
///
/// Writes go to a uniquely named sibling temp file that is renamed over the
/// target, so a crash mid-write never leaves a truncated manifest behind. The
/// target's permissions carry over to the new file, and a target marked
/// read-only is refused with a permission error instead of being replaced.
#[derive(Debug, Clone)]
pub struct DiskFileStore {
    root: PathBuf,
}

impl DiskFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DiskFileStore { root: root.into() }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl FileStore for DiskFileStore {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_file()
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        let full = self.resolve(path);
        fs::read(&full).map_err(|e| StorageError::from_io(full, e))
    }

    fn write(&mut self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        let full = self.resolve(path);
        let parent = full.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(|e| StorageError::from_io(parent, e))?;

        let permissions = match fs::metadata(&full) {
            Ok(metadata) => Some(metadata.permissions()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => return Err(StorageError::from_io(&full, err)),
        };
        if permissions.as_ref().is_some_and(|p| p.readonly()) {
            return Err(StorageError::Io {
                path: full.clone(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "file is read-only"),
            });
        }

        let mut tmp =
            NamedTempFile::new_in(parent).map_err(|e| StorageError::from_io(parent, e))?;
        tmp.write_all(bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| StorageError::from_io(tmp.path(), e))?;
        if let Some(permissions) = permissions {
            tmp.as_file()
                .set_permissions(permissions)
                .map_err(|e| StorageError::from_io(tmp.path(), e))?;
        }
        // A failed persist drops the temp file, which removes it.
        tmp.persist(&full)
            .map(|_| ())
            .map_err(|e| StorageError::from_io(&full, e.error))
    }

    fn list_dirs(&self, path: &Path) -> Result<Vec<String>, StorageError> {
        let full = self.resolve(path);
        let entries = match fs::read_dir(&full) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StorageError::from_io(&full, err)),
        };

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::from_io(&full, e))?;
            let is_dir = entry
                .file_type()
                .map_err(|e| StorageError::from_io(entry.path(), e))?
                .is_dir();
            if is_dir {
                dirs.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        dirs.sort();
        Ok(dirs)
    }
}
