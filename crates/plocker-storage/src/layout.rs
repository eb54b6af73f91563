//! Where the host keeps plugin files inside a vault.

use std::path::{Path, PathBuf};

use plocker_core::PluginId;

/// Default name of the host's config directory inside a vault.
pub const DEFAULT_CONFIG_DIR: &str = ".obsidian";

const PLUGINS_DIR: &str = "plugins";
const MANIFEST_FILE: &str = "manifest.json";
const DATA_FILE: &str = "data.json";

/// Resolves plugin paths relative to the vault root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultLayout {
    config_dir: PathBuf,
}

impl VaultLayout {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        VaultLayout {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// `<configDir>/plugins`
    pub fn plugins_dir(&self) -> PathBuf {
        self.config_dir.join(PLUGINS_DIR)
    }

    /// `<configDir>/plugins/<id>`
    pub fn plugin_dir(&self, id: &PluginId) -> PathBuf {
        self.plugins_dir().join(id.as_str())
    }

    /// `<configDir>/plugins/<id>/manifest.json`
    pub fn manifest_path(&self, id: &PluginId) -> PathBuf {
        self.plugin_dir(id).join(MANIFEST_FILE)
    }

    /// `<configDir>/plugins/<id>/data.json`, where the host keeps a plugin's
    /// saved settings.
    pub fn data_path(&self, id: &PluginId) -> PathBuf {
        self.plugin_dir(id).join(DATA_FILE)
    }
}

impl Default for VaultLayout {
    fn default() -> Self {
        VaultLayout::new(DEFAULT_CONFIG_DIR)
    }
}
