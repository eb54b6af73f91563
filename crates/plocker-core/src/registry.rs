//! The lock registry and its persisted form.
//!
//! [`LockRegistry`] maps each locked [`PluginId`] to the [`LockRecord`] that
//! captured its original version. It is the source of truth for whether a
//! plugin is locked; the manifest on disk only mirrors it.
//!
//! # Persisted schema
//!
//! Schema 2 (current):
//!
//! ```json
//! { "schemaVersion": 2, "lockedPlugins": [
//!     { "pluginId": "x", "originalVersion": "1.0.0", "updatedVersion": "9999.1.0.0" } ] }
//! ```
//!
//! Schema 1 stored bare ids (`{ "lockedPlugins": ["x"] }`) and always wrote
//! [`LEGACY_SENTINEL_VERSION`]. Those entries migrate into records without an
//! original version.
//!
//! A blob whose `schemaVersion` is newer than [`SCHEMA_VERSION`] is read on a
//! best-effort basis but never written back.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::id::PluginId;
use crate::version::{sentinel_version, LEGACY_SENTINEL_VERSION};

/// Current persisted schema version.
pub const SCHEMA_VERSION: u64 = 2;

const SCHEMA_KEY: &str = "schemaVersion";
const RECORDS_KEY: &str = "lockedPlugins";

/// One locked plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRecord {
    pub plugin_id: PluginId,
    /// Manifest version captured when the lock was taken. `None` for records
    /// migrated from schema 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_version: Option<String>,
    /// Sentinel version written into the manifest while locked.
    pub updated_version: String,
}

impl LockRecord {
    /// Captures `original_version` and derives the sentinel from it.
    pub fn capture(plugin_id: PluginId, original_version: &str) -> Self {
        LockRecord {
            plugin_id,
            original_version: Some(original_version.to_string()),
            updated_version: sentinel_version(original_version),
        }
    }

    /// A record as schema 1 would have implied it.
    pub fn legacy(plugin_id: PluginId) -> Self {
        LockRecord {
            plugin_id,
            original_version: None,
            updated_version: LEGACY_SENTINEL_VERSION.to_string(),
        }
    }
}

/// Locked plugins keyed by id, in the order they were locked.
///
/// Unknown top-level keys found in the persisted blob are kept and written
/// back on save.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LockRegistry {
    records: IndexMap<PluginId, LockRecord>,
    extra: Map<String, Value>,
    /// Set when the blob came from a newer schema than this build writes.
    newer_schema: Option<u64>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self, id: &PluginId) -> bool {
        self.records.contains_key(id)
    }

    pub fn get(&self, id: &PluginId) -> Option<&LockRecord> {
        self.records.get(id)
    }

    /// Inserts or replaces the record for `record.plugin_id`, returning the
    /// replaced record.
    pub fn insert(&mut self, record: LockRecord) -> Option<LockRecord> {
        self.records.insert(record.plugin_id.clone(), record)
    }

    /// Removes a record, keeping the order of the rest.
    pub fn remove(&mut self, id: &PluginId) -> Option<LockRecord> {
        self.records.shift_remove(id)
    }

    pub fn records(&self) -> impl Iterator<Item = &LockRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Decodes a persisted blob of either schema.
    ///
    /// A missing `lockedPlugins` key yields an empty registry. Individual
    /// entries that cannot be decoded are skipped with a warning; when the
    /// same plugin id appears twice the first entry wins.
    pub fn from_persisted(value: Value) -> Result<Self, CoreError> {
        let Value::Object(mut extra) = value else {
            return Err(CoreError::MalformedRegistry {
                reason: "settings blob is not a JSON object".to_string(),
            });
        };
        let newer_schema = match extra.remove(SCHEMA_KEY) {
            None => None,
            Some(Value::Number(n)) => match n.as_u64() {
                Some(found) if found > SCHEMA_VERSION => {
                    tracing::warn!(
                        "Lock settings use schema {}, newer than {}; they will be read but not saved",
                        found,
                        SCHEMA_VERSION
                    );
                    Some(found)
                }
                Some(_) => None,
                None => {
                    tracing::warn!("Ignoring non-integer `{}`: {}", SCHEMA_KEY, n);
                    None
                }
            },
            Some(other) => {
                tracing::warn!("Ignoring `{}` of unexpected type: {}", SCHEMA_KEY, other);
                None
            }
        };
        let entries = match extra.remove(RECORDS_KEY) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                return Err(CoreError::MalformedRegistry {
                    reason: format!("`{RECORDS_KEY}` is not an array"),
                })
            }
        };

        let mut registry = LockRegistry {
            records: IndexMap::new(),
            extra,
            newer_schema,
        };
        for entry in entries {
            let Some(record) = decode_entry(entry) else {
                continue;
            };
            if registry.is_locked(&record.plugin_id) {
                tracing::warn!("Ignoring duplicate lock record for {}", record.plugin_id);
                continue;
            }
            registry.insert(record);
        }
        Ok(registry)
    }

    /// Encodes the registry in the current schema.
    ///
    /// Fails with [`CoreError::UnsupportedSchema`] when the registry was
    /// decoded from a newer schema, since writing it back would lose data.
    pub fn to_persisted(&self) -> Result<Value, CoreError> {
        if let Some(found) = self.newer_schema {
            return Err(CoreError::UnsupportedSchema {
                found,
                supported: SCHEMA_VERSION,
            });
        }
        let mut blob = self.extra.clone();
        blob.insert(SCHEMA_KEY.to_string(), Value::from(SCHEMA_VERSION));
        let records = self.records.values().collect::<Vec<_>>();
        blob.insert(RECORDS_KEY.to_string(), serde_json::to_value(records)?);
        Ok(Value::Object(blob))
    }
}

fn decode_entry(entry: Value) -> Option<LockRecord> {
    match entry {
        Value::String(raw) => match PluginId::parse(&raw) {
            Ok(id) => Some(LockRecord::legacy(id)),
            Err(err) => {
                tracing::warn!("Skipping legacy lock entry: {}", err);
                None
            }
        },
        Value::Object(_) => match serde_json::from_value::<LockRecord>(entry) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!("Skipping unreadable lock record: {}", err);
                None
            }
        },
        other => {
            tracing::warn!("Skipping lock entry of unexpected type: {}", other);
            None
        }
    }
}
