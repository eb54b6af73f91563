//! The lock controller.
//!
//! [`LockController`] owns the [`LockRegistry`] and is the only code that
//! mutates it. Each toggle runs to completion in a fixed order (read the
//! manifest, update the registry, write the manifest, persist the registry)
//! and is never interleaved with another toggle.
//!
//! Failures are logged and reported in the returned [`ToggleReport`]; they are
//! never propagated. Two rules decide what happens to the registry when the
//! manifest cannot be touched:
//!
//! - locking adds a record only if the manifest was read and does not already
//!   declare a sentinel, and keeps it even if the sentinel could not be
//!   written back;
//! - unlocking always removes the record, even if the original version could
//!   not be restored. The report then carries the dropped original version so
//!   the caller can surface it.

use serde::Serialize;

use plocker_core::manifest::patch_version;
use plocker_core::{is_sentinel, LockRecord, LockRegistry, Manifest, PluginId};
use plocker_storage::{FileStore, RegistryStore, StorageError, VaultLayout};

/// What happened to the manifest file during a toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ManifestUpdate {
    Written { version: String },
    Failed { reason: String },
    /// Nothing could be written, e.g. a migrated record with no known
    /// original version.
    Skipped { reason: String },
}

impl ManifestUpdate {
    pub fn is_written(&self) -> bool {
        matches!(self, ManifestUpdate::Written { .. })
    }
}

/// Registry-level effect of a toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum LockChange {
    Locked {
        record: LockRecord,
        manifest: ManifestUpdate,
    },
    Unlocked {
        record: LockRecord,
        manifest: ManifestUpdate,
    },
    /// The lock was not taken; the registry is unchanged.
    Unchanged { reason: String },
}

/// Result of [`LockController::toggle_lock`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleReport {
    pub plugin_id: PluginId,
    #[serde(flatten)]
    pub change: LockChange,
    /// Whether the registry was saved after the toggle.
    pub persisted: bool,
}

impl ToggleReport {
    /// Lock state after the toggle.
    pub fn is_locked(&self) -> bool {
        matches!(self.change, LockChange::Locked { .. })
    }

    /// A user-facing warning when registry and manifest may disagree.
    pub fn warning(&self) -> Option<String> {
        let id = &self.plugin_id;
        let manifest_warning = match &self.change {
            LockChange::Locked {
                record,
                manifest: ManifestUpdate::Failed { reason },
            } => Some(format!(
                "{id} is marked locked but its manifest still lacks version {} ({reason})",
                record.updated_version
            )),
            LockChange::Unlocked { record, manifest } if !manifest.is_written() => {
                match &record.original_version {
                    Some(original) => Some(format!(
                        "{id} is unlocked but its manifest was not restored; \
                         set its version back to {original} by hand"
                    )),
                    None => Some(format!(
                        "{id} is unlocked but its original version was never recorded; \
                         reinstall the plugin to restore its version"
                    )),
                }
            }
            LockChange::Unchanged { reason } => Some(format!("{id} was not locked: {reason}")),
            _ => None,
        };
        match (manifest_warning, self.persisted) {
            (warning, true) => warning,
            (Some(warning), false) => Some(format!("{warning}; lock settings were not saved")),
            (None, false) => Some(format!("{id}: lock settings were not saved")),
        }
    }
}

/// On-disk state of one locked plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuditStatus {
    /// The manifest declares the record's sentinel version.
    Consistent,
    /// The manifest declares some other version.
    Drifted { on_disk: String },
    /// The manifest is missing or unreadable.
    Unreadable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    pub record: LockRecord,
    #[serde(flatten)]
    pub status: AuditStatus,
}

/// Keeps the lock registry and the plugin manifests in step.
pub struct LockController<F: FileStore, R: RegistryStore> {
    files: F,
    settings: R,
    layout: VaultLayout,
    registry: LockRegistry,
}

impl<F: FileStore, R: RegistryStore> LockController<F, R> {
    /// Loads the persisted registry and takes ownership of both stores.
    pub fn new(files: F, settings: R, layout: VaultLayout) -> Self {
        let registry = settings.load();
        tracing::debug!("Loaded {} lock record(s)", registry.len());
        LockController {
            files,
            settings,
            layout,
            registry,
        }
    }

    pub fn registry(&self) -> &LockRegistry {
        &self.registry
    }

    pub fn files(&self) -> &F {
        &self.files
    }

    pub fn layout(&self) -> &VaultLayout {
        &self.layout
    }

    pub fn into_parts(self) -> (F, R) {
        (self.files, self.settings)
    }

    pub fn is_locked(&self, id: &PluginId) -> bool {
        self.registry.is_locked(id)
    }

    /// Flips the lock state of `id` and persists the registry once.
    ///
    /// The caller is responsible for only offering installed, non-built-in
    /// plugins other than the locker itself.
    pub fn toggle_lock(&mut self, id: &PluginId) -> ToggleReport {
        let change = match self.registry.get(id).cloned() {
            Some(record) => self.unlock(record),
            None => self.lock(id),
        };
        let persisted = self.persist();
        ToggleReport {
            plugin_id: id.clone(),
            change,
            persisted,
        }
    }

    /// Compares every record against the manifest on disk. Read-only.
    pub fn audit(&self) -> Vec<AuditEntry> {
        self.registry
            .records()
            .map(|record| {
                let status = match self.read_manifest(&record.plugin_id) {
                    Ok(manifest) if manifest.version() == record.updated_version => {
                        AuditStatus::Consistent
                    }
                    Ok(manifest) => AuditStatus::Drifted {
                        on_disk: manifest.version().to_string(),
                    },
                    Err(err) => AuditStatus::Unreadable {
                        reason: err.to_string(),
                    },
                };
                AuditEntry {
                    record: record.clone(),
                    status,
                }
            })
            .collect()
    }

    fn lock(&mut self, id: &PluginId) -> LockChange {
        let path = self.layout.manifest_path(id);
        let bytes = match self.files.read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!("Failed to read manifest for {}: {}", id, err);
                return LockChange::Unchanged {
                    reason: err.to_string(),
                };
            }
        };
        let manifest = match Manifest::from_slice(&bytes) {
            Ok(manifest) => manifest,
            Err(err) => {
                tracing::error!("Failed to process version information for {}: {}", id, err);
                return LockChange::Unchanged {
                    reason: err.to_string(),
                };
            }
        };
        // Capturing a sentinel as the original would make it unrecoverable.
        if is_sentinel(manifest.version()) {
            tracing::warn!(
                "Manifest for {} already declares sentinel version {}; not locking",
                id,
                manifest.version()
            );
            return LockChange::Unchanged {
                reason: format!(
                    "manifest already declares sentinel version {}; restore its original version first",
                    manifest.version()
                ),
            };
        }

        let record = LockRecord::capture(id.clone(), manifest.version());
        self.registry.insert(record.clone());
        let manifest = self.write_version(id, &bytes, &record.updated_version);
        if manifest.is_written() {
            tracing::info!("Updated version of {} to {}", id, record.updated_version);
        }
        LockChange::Locked { record, manifest }
    }

    fn unlock(&mut self, record: LockRecord) -> LockChange {
        let id = record.plugin_id.clone();
        let manifest = match &record.original_version {
            Some(original) => self.restore_version(&id, original),
            None => {
                tracing::warn!(
                    "No original version recorded for {}; manifest left at {}",
                    id,
                    record.updated_version
                );
                ManifestUpdate::Skipped {
                    reason: "original version unknown".to_string(),
                }
            }
        };
        if let ManifestUpdate::Failed { .. } = &manifest {
            tracing::warn!(
                "Dropping lock record for {} although its manifest was not restored (original version {})",
                id,
                record.original_version.as_deref().unwrap_or("unknown")
            );
        }
        self.registry.remove(&id);
        LockChange::Unlocked { record, manifest }
    }

    fn restore_version(&mut self, id: &PluginId, original: &str) -> ManifestUpdate {
        let path = self.layout.manifest_path(id);
        let bytes = match self.files.read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!("Failed to restore version for {}: {}", id, err);
                return ManifestUpdate::Failed {
                    reason: err.to_string(),
                };
            }
        };
        let update = self.write_version(id, &bytes, original);
        if update.is_written() {
            tracing::info!("Restored version of {} to {}", id, original);
        }
        update
    }

    /// Rewrites the manifest held in `bytes` with `version` in place.
    fn write_version(&mut self, id: &PluginId, bytes: &[u8], version: &str) -> ManifestUpdate {
        let path = self.layout.manifest_path(id);
        let result = patch_version(bytes, version)
            .map_err(StorageError::from)
            .and_then(|(_, patched)| self.files.write(&path, &patched));
        match result {
            Ok(()) => ManifestUpdate::Written {
                version: version.to_string(),
            },
            Err(err) => {
                tracing::error!("Failed to update version for {}: {}", id, err);
                ManifestUpdate::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    fn read_manifest(&self, id: &PluginId) -> Result<Manifest, StorageError> {
        let bytes = self.files.read(&self.layout.manifest_path(id))?;
        Ok(Manifest::from_slice(&bytes)?)
    }

    fn persist(&mut self) -> bool {
        match self.settings.save(&self.registry) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!("Failed to save lock settings: {}", err);
                false
            }
        }
    }
}
