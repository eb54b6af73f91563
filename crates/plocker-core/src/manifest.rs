//! Plugin manifest access.
//!
//! The manifest belongs to the host. Only `version` is ever changed; every
//! other field is carried through untouched and in its original key order,
//! and the file is re-emitted the way the host writes it (two-space pretty
//! JSON, no trailing newline).

use serde_json::{Map, Value};

use crate::error::CoreError;

/// A decoded `manifest.json`.
///
/// Invariant: `version` is present and is a JSON string.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    fields: Map<String, Value>,
}

impl Manifest {
    /// Decodes manifest bytes, requiring an object with a string `version`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CoreError> {
        let value: Value = serde_json::from_slice(bytes).map_err(CoreError::ManifestParse)?;
        let Value::Object(fields) = value else {
            return Err(CoreError::ManifestNotObject);
        };
        if !matches!(fields.get("version"), Some(Value::String(_))) {
            return Err(CoreError::MissingVersion);
        }
        Ok(Manifest { fields })
    }

    pub fn version(&self) -> &str {
        self.str_field("version").unwrap_or_default()
    }

    /// Replaces `version`, keeping its position among the other keys.
    pub fn set_version(&mut self, version: impl Into<String>) {
        self.fields
            .insert("version".to_string(), Value::String(version.into()));
    }

    pub fn id(&self) -> Option<&str> {
        self.str_field("id")
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    pub fn author(&self) -> Option<&str> {
        self.str_field("author")
    }

    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }

    pub fn is_builtin(&self) -> bool {
        self.bool_field("isBuiltin")
    }

    pub fn is_desktop_only(&self) -> bool {
        self.bool_field("isDesktopOnly")
    }

    /// Encodes the manifest as the host writes it.
    pub fn to_pretty_bytes(&self) -> Result<Vec<u8>, CoreError> {
        Ok(serde_json::to_vec_pretty(&self.fields)?)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    fn bool_field(&self, key: &str) -> bool {
        self.fields.get(key).and_then(Value::as_bool).unwrap_or(false)
    }
}

/// Decodes `bytes`, swaps in `version`, and re-encodes.
///
/// Returns the version that was replaced together with the new file contents.
pub fn patch_version(bytes: &[u8], version: &str) -> Result<(String, Vec<u8>), CoreError> {
    let mut manifest = Manifest::from_slice(bytes)?;
    let previous = manifest.version().to_string();
    manifest.set_version(version);
    Ok((previous, manifest.to_pretty_bytes()?))
}
