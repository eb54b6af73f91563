//! Installed plugin enumeration.
//!
//! [`PluginCatalog`] is the narrow view of the host's plugin registry the
//! settings panel needs. [`ManifestCatalog`] builds it by reading every
//! `<configDir>/plugins/*/manifest.json` through a [`FileStore`].

use serde::Serialize;

use plocker_core::{Manifest, PluginId};

use crate::error::StorageError;
use crate::layout::VaultLayout;
use crate::traits::FileStore;

/// One installed plugin as the settings panel sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginEntry {
    pub id: PluginId,
    pub name: String,
    /// Version currently declared by the manifest on disk.
    pub version: String,
    pub is_builtin: bool,
    pub is_desktop_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Source of installed plugins.
pub trait PluginCatalog {
    fn list(&self) -> Result<Vec<PluginEntry>, StorageError>;
}

/// Catalog backed by the manifests in the plugins folder.
///
/// The folder name is the plugin id. Folders without a manifest are skipped
/// quietly; folders whose name is not a usable id or whose manifest is
/// unreadable are skipped with a warning.
pub struct ManifestCatalog<'a, F: FileStore> {
    store: &'a F,
    layout: &'a VaultLayout,
}

impl<'a, F: FileStore> ManifestCatalog<'a, F> {
    pub fn new(store: &'a F, layout: &'a VaultLayout) -> Self {
        ManifestCatalog { store, layout }
    }

    fn entry_for(&self, folder: &str) -> Option<PluginEntry> {
        let id = match PluginId::parse(folder) {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!("Skipping plugin folder '{}': {}", folder, err);
                return None;
            }
        };
        let path = self.layout.manifest_path(&id);
        if !self.store.exists(&path) {
            tracing::debug!("Plugin folder '{}' has no manifest", id);
            return None;
        }
        let manifest = match self
            .store
            .read(&path)
            .and_then(|bytes| Manifest::from_slice(&bytes).map_err(StorageError::from))
        {
            Ok(manifest) => manifest,
            Err(err) => {
                tracing::warn!("Skipping plugin '{}': {}", id, err);
                return None;
            }
        };
        if let Some(declared) = manifest.id() {
            if declared != id.as_str() {
                tracing::warn!(
                    "Plugin folder '{}' declares id '{}'; using the folder name",
                    id,
                    declared
                );
            }
        }
        Some(PluginEntry {
            name: manifest.name().unwrap_or(id.as_str()).to_string(),
            version: manifest.version().to_string(),
            is_builtin: manifest.is_builtin(),
            is_desktop_only: manifest.is_desktop_only(),
            author: manifest.author().map(str::to_string),
            description: manifest.description().map(str::to_string),
            id,
        })
    }
}

impl<F: FileStore> PluginCatalog for ManifestCatalog<'_, F> {
    fn list(&self) -> Result<Vec<PluginEntry>, StorageError> {
        let folders = self.store.list_dirs(&self.layout.plugins_dir())?;
        Ok(folders
            .iter()
            .filter_map(|folder| self.entry_for(folder))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryFileStore;

    #[test]
    fn lists_readable_manifests_by_folder() {
        let store = InMemoryFileStore::new()
            .with_file(
                ".obsidian/plugins/dataview/manifest.json",
                r#"{"id":"dataview","name":"Dataview","version":"0.5.66","author":"Example Author","description":"Query your notes."}"#,
            )
            .with_file(
                ".obsidian/plugins/broken/manifest.json",
                "{ this is not json",
            )
            .with_file(".obsidian/plugins/empty/main.js", "")
            .with_file(
                ".obsidian/plugins/calendar/manifest.json",
                r#"{"id":"calendar","version":"1.5.10","isDesktopOnly":true}"#,
            );
        let layout = VaultLayout::default();
        let entries = ManifestCatalog::new(&store, &layout).list().unwrap();

        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["calendar", "dataview"]);
        assert_eq!(entries[0].name, "calendar");
        assert!(entries[0].is_desktop_only);
        assert_eq!(entries[1].name, "Dataview");
        assert_eq!(entries[1].version, "0.5.66");
        assert_eq!(entries[1].author.as_deref(), Some("Example Author"));
        assert_eq!(entries[1].description.as_deref(), Some("Query your notes."));
        assert_eq!(entries[0].author, None);
    }

    #[test]
    fn entry_json_omits_absent_author_and_description() {
        let store = InMemoryFileStore::new().with_file(
            ".obsidian/plugins/calendar/manifest.json",
            r#"{"id":"calendar","version":"1.5.10","isDesktopOnly":true}"#,
        );
        let layout = VaultLayout::default();
        let entries = ManifestCatalog::new(&store, &layout).list().unwrap();
        assert_eq!(
            serde_json::to_value(&entries[0]).unwrap(),
            serde_json::json!({
                "id": "calendar",
                "name": "calendar",
                "version": "1.5.10",
                "isBuiltin": false,
                "isDesktopOnly": true
            })
        );
    }

    #[test]
    fn missing_plugins_folder_is_empty() {
        let store = InMemoryFileStore::new();
        let layout = VaultLayout::default();
        assert!(ManifestCatalog::new(&store, &layout).list().unwrap().is_empty());
    }
}
