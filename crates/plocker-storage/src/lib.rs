//! Storage seams for the plugin update locker.
//!
//! Everything that touches the host's files goes through the [`FileStore`]
//! trait, so the lock logic never depends on a concrete filesystem. Two
//! backends are first-class: [`InMemoryFileStore`] for tests and
//! [`DiskFileStore`] for a real vault.
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`traits`]: FileStore trait definition
//! - [`memory`]: InMemoryFileStore implementation
//! - [`disk`]: DiskFileStore implementation
//! - [`layout`]: VaultLayout path resolution under the config dir
//! - [`catalog`]: PluginCatalog trait and the manifest-backed catalog
//! - [`settings`]: RegistryStore trait and the JSON settings blob store

pub mod catalog;
pub mod disk;
pub mod error;
pub mod layout;
pub mod memory;
pub mod settings;
pub mod traits;

// Re-export key types for ergonomic use.
pub use catalog::{ManifestCatalog, PluginCatalog, PluginEntry};
pub use disk::DiskFileStore;
pub use error::StorageError;
pub use layout::VaultLayout;
pub use memory::InMemoryFileStore;
pub use settings::{JsonRegistryStore, RegistryStore};
pub use traits::FileStore;
