//! Process-wide variable store

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

/// Ordered `name -> value` mapping shared by every dispatch.
///
/// Cloning the store shares the underlying map. Writes are last-write-wins
/// per name. A name keeps its original position when overwritten.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    inner: Arc<RwLock<IndexMap<String, String>>>,
}

impl VariableStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.inner.read().get(name).cloned()
    }

    /// Sets `name` to `value`.
    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.write().insert(name.into(), value.into());
    }

    /// Removes `name`, returning its value.
    pub fn remove(&self, name: &str) -> Option<String> {
        self.inner.write().shift_remove(name)
    }

    /// Returns a copy of the current mapping.
    #[must_use]
    pub fn snapshot(&self) -> IndexMap<String, String> {
        self.inner.read().clone()
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns true if the store holds no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariableStore {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let map = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }
}
