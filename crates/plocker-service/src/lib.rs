//! Lock control and the settings panel for the plugin update locker.
//!
//! [`LockController`] is the only stateful piece: it owns the
//! [`LockRegistry`](plocker_core::LockRegistry) and keeps it consistent with
//! the manifests on disk. [`SettingsPanel`] is the list-and-toggle surface in
//! front of it, with a debounced search box.

pub mod controller;
pub mod debounce;
pub mod panel;

pub use controller::{
    AuditEntry, AuditStatus, LockChange, LockController, ManifestUpdate, ToggleReport,
};
pub use debounce::{Debouncer, SEARCH_DEBOUNCE};
pub use panel::{PanelView, PluginRow, SettingsPanel, NO_MATCHES_MESSAGE};
