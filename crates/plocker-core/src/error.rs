//! Core error types for plocker-core.
//!
//! Uses `thiserror` for structured, matchable variants covering manifest
//! decoding, plugin id validation, and persisted registry decoding.

use thiserror::Error;

/// Errors produced by the plocker-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The manifest bytes are not valid JSON.
    #[error("manifest is not valid JSON: {0}")]
    ManifestParse(#[source] serde_json::Error),

    /// The manifest is valid JSON but not an object.
    #[error("manifest is not a JSON object")]
    ManifestNotObject,

    /// The manifest has no string `version` field.
    #[error("manifest has no string `version` field")]
    MissingVersion,

    /// A plugin id cannot be used as a plugin folder name.
    #[error("invalid plugin id '{id}': {reason}")]
    InvalidPluginId { id: String, reason: &'static str },

    /// The persisted registry blob has an unusable shape.
    #[error("malformed lock registry: {reason}")]
    MalformedRegistry { reason: String },

    /// The persisted registry was written by a newer schema and must not be
    /// overwritten.
    #[error("lock settings use schema {found}, newer than supported schema {supported}")]
    UnsupportedSchema { found: u64, supported: u64 },

    /// JSON serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
