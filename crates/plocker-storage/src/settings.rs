//! Persistence for the lock registry.
//!
//! The host gives each plugin one JSON settings blob. [`RegistryStore`] is
//! the load/save contract over that blob; [`JsonRegistryStore`] keeps it in a
//! file through a [`FileStore`], by default the plugin's own `data.json`.

use std::path::{Path, PathBuf};

use plocker_core::LockRegistry;

use crate::error::StorageError;
use crate::traits::FileStore;

/// Load/save contract for the persisted registry.
pub trait RegistryStore {
    /// Returns the persisted registry, or an empty one when nothing usable is
    /// stored. Never fails.
    fn load(&self) -> LockRegistry;

    /// Replaces the persisted registry with `registry`.
    fn save(&mut self, registry: &LockRegistry) -> Result<(), StorageError>;
}

/// Registry persisted as pretty JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonRegistryStore<F: FileStore> {
    store: F,
    path: PathBuf,
}

impl<F: FileStore> JsonRegistryStore<F> {
    pub fn new(store: F, path: impl Into<PathBuf>) -> Self {
        JsonRegistryStore {
            store,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> &F {
        &self.store
    }

    fn try_load(&self) -> Result<LockRegistry, StorageError> {
        let bytes = self.store.read(&self.path)?;
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;
        Ok(LockRegistry::from_persisted(value)?)
    }
}

impl<F: FileStore> RegistryStore for JsonRegistryStore<F> {
    fn load(&self) -> LockRegistry {
        match self.try_load() {
            Ok(registry) => registry,
            Err(err) if err.is_not_found() => LockRegistry::new(),
            Err(err) => {
                tracing::warn!(
                    "Ignoring unreadable lock settings at {}: {}",
                    self.path.display(),
                    err
                );
                LockRegistry::new()
            }
        }
    }

    fn save(&mut self, registry: &LockRegistry) -> Result<(), StorageError> {
        let blob = registry.to_persisted()?;
        let bytes = serde_json::to_vec_pretty(&blob)?;
        self.store.write(&self.path, &bytes)
    }
}
