//! Core data model for the plugin update locker.
//!
//! A locked plugin has its manifest `version` replaced by a sentinel that the
//! host's update check always considers newer than anything published. This
//! crate owns the pieces of that trick that do no I/O:
//!
//! - [`id`]: the [`PluginId`] newtype
//! - [`version`]: sentinel construction and the host's version ordering
//! - [`manifest`]: order-preserving manifest parsing and version patching
//! - [`registry`]: [`LockRecord`], [`LockRegistry`] and the persisted schema
//! - [`filter`]: the case-insensitive plugin name filter
//! - [`error`]: [`CoreError`]

pub mod error;
pub mod filter;
pub mod id;
pub mod manifest;
pub mod registry;
pub mod version;

// Re-export commonly used types
pub use error::CoreError;
pub use filter::{filter_by_name, normalize_query};
pub use id::PluginId;
pub use manifest::Manifest;
pub use registry::{LockRecord, LockRegistry};
pub use version::{compare_versions, is_sentinel, sentinel_version};
