//! Enable-able key/value pairs and the header merge.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::id::generate_id;

/// A single key/value entry with an enable flag.
///
/// Used for headers, query and path params, form fields, gRPC metadata
/// and environment values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    /// Unique identifier of the entry
    #[serde(default = "generate_id")]
    pub id: String,
    /// The key (e.g., "Content-Type")
    pub key: String,
    /// The value (may contain `{{variable}}` placeholders)
    #[serde(default)]
    pub value: String,
    /// Whether this entry is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_enabled() -> bool {
    true
}

impl KeyValue {
    /// Creates a new enabled entry.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }

    /// Creates a new disabled entry.
    #[must_use]
    pub fn disabled(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            enabled: false,
            ..Self::new(key, value)
        }
    }
}

/// Merges `overrides` on top of `base`.
///
/// Disabled entries on either side are ignored. Every enabled base entry
/// whose key (case-insensitive) does not appear among the enabled overrides
/// is kept in its original order, followed by all enabled overrides in
/// their original order.
///
/// An empty `base` returns `overrides` untouched, disabled entries included.
#[must_use]
pub fn merge_key_values(base: &[KeyValue], overrides: Vec<KeyValue>) -> Vec<KeyValue> {
    if base.is_empty() {
        return overrides;
    }

    let overridden: HashSet<String> = overrides
        .iter()
        .filter(|kv| kv.enabled)
        .map(|kv| kv.key.to_lowercase())
        .collect();

    let mut merged: Vec<KeyValue> = base
        .iter()
        .filter(|kv| kv.enabled && !overridden.contains(&kv.key.to_lowercase()))
        .cloned()
        .collect();

    merged.extend(overrides.into_iter().filter(|kv| kv.enabled));
    merged
}
