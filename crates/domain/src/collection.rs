//! Collection domain type

use serde::{Deserialize, Serialize};

use crate::auth::Auth;
use crate::id::generate_id;
use crate::key_value::KeyValue;

/// A named grouping of requests sharing base headers and auth.
///
/// Child requests resolve against these values lazily at send time, so an
/// edit here reaches every inheriting request without touching it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Base headers merged under every child request's headers
    #[serde(default)]
    pub headers: Vec<KeyValue>,
    /// Auth used by children whose own auth is `Inherit`
    #[serde(default)]
    pub auth: Auth,
}

impl Collection {
    /// Creates an empty collection with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            headers: Vec::new(),
            auth: Auth::None,
        }
    }

    /// Sets the id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the base auth.
    #[must_use]
    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    /// Adds a base header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(KeyValue::new(key, value));
        self
    }
}
