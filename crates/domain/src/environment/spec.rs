//! Environment type and update source tags

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::generate_id;
use crate::key_value::KeyValue;

/// An ordered list of variable entries, keyed by a unique environment id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Unique identifier
    pub id: String,
    /// Environment name (e.g., "Development", "Production")
    pub name: String,
    /// Variable entries in display order
    #[serde(default)]
    pub values: Vec<KeyValue>,
}

impl Environment {
    /// Creates a new empty environment with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            values: Vec::new(),
        }
    }

    /// Sets the id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Adds an enabled entry.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.push(KeyValue::new(key, value));
        self
    }

    /// Returns the value of the first enabled entry named `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|kv| kv.enabled && kv.key == key)
            .map(|kv| kv.value.as_str())
    }

    /// Sets `key` to `value`.
    ///
    /// Updates the entry [`get`](Self::get) would read, keeping its id. With
    /// no enabled entry the first disabled one is updated and stays disabled.
    /// Otherwise a new enabled entry is appended.
    pub fn set_key(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        let index = self
            .values
            .iter()
            .position(|kv| kv.enabled && kv.key == key)
            .or_else(|| self.values.iter().position(|kv| kv.key == key));
        match index {
            Some(index) => self.values[index].value = value,
            None => self.values.push(KeyValue::new(key, value)),
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Which component wrote an environment update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSource {
    /// Post-request processing of an HTTP request
    Http,
    /// Post-request processing of a GraphQL request
    GraphQl,
    /// Post-request processing of a gRPC request
    Grpc,
    /// A post-request script
    Script,
    /// A direct user edit
    User,
}

impl fmt::Display for UpdateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Http => "http",
            Self::GraphQl => "graphql",
            Self::Grpc => "grpc",
            Self::Script => "script",
            Self::User => "user",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_key_updates_in_place() {
        let mut env = Environment::new("dev").with_value("host", "a");
        let id = env.values[0].id.clone();

        env.set_key("host", "b");
        assert_eq!(env.len(), 1);
        assert_eq!(env.get("host"), Some("b"));
        assert_eq!(env.values[0].id, id);
    }

    #[test]
    fn test_set_key_appends() {
        let mut env = Environment::new("dev");
        env.set_key("token", "t");
        assert_eq!(env.get("token"), Some("t"));
    }

    #[test]
    fn test_set_key_prefers_the_enabled_entry() {
        let mut env = Environment::new("dev");
        env.values.push(KeyValue::disabled("host", "old"));
        env.values.push(KeyValue::new("host", "a"));

        env.set_key("host", "b");
        assert_eq!(env.get("host"), Some("b"));
        assert_eq!(env.values[0].value, "old");
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn test_set_key_falls_back_to_disabled_entry() {
        let mut env = Environment::new("dev");
        env.values.push(KeyValue::disabled("host", "old"));

        env.set_key("host", "b");
        assert_eq!(env.len(), 1);
        assert_eq!(env.values[0].value, "b");
        assert_eq!(env.get("host"), None);
    }

    #[test]
    fn test_disabled_entries_are_not_visible() {
        let mut env = Environment::new("dev");
        env.values.push(KeyValue::disabled("host", "hidden"));
        assert_eq!(env.get("host"), None);
    }
}
