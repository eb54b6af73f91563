//! Plugin identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A host plugin id, as found in a manifest's `id` field and used as the
/// plugin's folder name under `<configDir>/plugins/`.
///
/// Construction rejects values that would escape the plugins folder when
/// joined onto it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PluginId(String);

impl PluginId {
    /// Validates and wraps a plugin id.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let invalid = |reason| CoreError::InvalidPluginId {
            id: raw.to_string(),
            reason,
        };
        if raw.trim().is_empty() {
            return Err(invalid("empty"));
        }
        if raw == "." || raw == ".." {
            return Err(invalid("relative path component"));
        }
        if raw.contains(['/', '\\']) {
            return Err(invalid("contains a path separator"));
        }
        if raw.contains('\0') {
            return Err(invalid("contains a NUL byte"));
        }
        Ok(PluginId(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for PluginId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PluginId::parse(&value)
    }
}

impl From<PluginId> for String {
    fn from(id: PluginId) -> Self {
        id.0
    }
}

impl std::str::FromStr for PluginId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PluginId::parse(s)
    }
}
