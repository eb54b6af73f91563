//! Runtime configuration for the `plocker` binary.
//!
//! Each setting comes from a flag or its environment variable:
//! - `PLOCKER_VAULT`: vault base path (default: ".")
//! - `PLOCKER_CONFIG_DIR`: host config dir inside the vault (default: ".obsidian")
//! - `PLOCKER_SELF_ID`: the locker's own plugin id (default: "plugin-update-locker")

use std::path::PathBuf;

use clap::Args;

use plocker_core::PluginId;
use plocker_service::LockController;
use plocker_storage::layout::DEFAULT_CONFIG_DIR;
use plocker_storage::{DiskFileStore, JsonRegistryStore, VaultLayout};

pub const DEFAULT_SELF_ID: &str = "plugin-update-locker";

pub type VaultController = LockController<DiskFileStore, JsonRegistryStore<DiskFileStore>>;

#[derive(Debug, Clone, Args)]
pub struct LockerConfig {
    /// Vault base path.
    #[arg(long, global = true, env = "PLOCKER_VAULT", default_value = ".")]
    pub vault: PathBuf,

    /// Host config directory inside the vault.
    #[arg(long, global = true, env = "PLOCKER_CONFIG_DIR", default_value = DEFAULT_CONFIG_DIR)]
    pub config_dir: PathBuf,

    /// Plugin id of the locker itself; its folder holds the saved lock settings.
    #[arg(long, global = true, env = "PLOCKER_SELF_ID", default_value = DEFAULT_SELF_ID)]
    pub self_id: PluginId,
}

impl LockerConfig {
    pub fn layout(&self) -> VaultLayout {
        VaultLayout::new(&self.config_dir)
    }

    /// Opens the vault and loads the saved lock settings.
    pub fn open_controller(&self) -> VaultController {
        let layout = self.layout();
        let files = DiskFileStore::new(&self.vault);
        let settings = JsonRegistryStore::new(files.clone(), layout.data_path(&self.self_id));
        tracing::debug!(
            "Opening vault {} (config dir {})",
            self.vault.display(),
            layout.config_dir().display()
        );
        LockController::new(files, settings, layout)
    }
}
