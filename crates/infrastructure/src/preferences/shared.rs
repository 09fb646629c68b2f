//! Runtime-replaceable preferences provider

use std::sync::Arc;

use courier_application::PreferencesProvider;
use courier_domain::Preferences;
use parking_lot::RwLock;

/// Holds the current preferences snapshot.
///
/// Clones share the same snapshot, so a `replace` is seen by every sender
/// on its next send.
#[derive(Debug, Clone, Default)]
pub struct SharedPreferences {
    inner: Arc<RwLock<Preferences>>,
}

impl SharedPreferences {
    /// Creates a provider starting from `preferences`.
    #[must_use]
    pub fn new(preferences: Preferences) -> Self {
        Self {
            inner: Arc::new(RwLock::new(preferences)),
        }
    }

    /// Swaps in a new snapshot.
    pub fn replace(&self, preferences: Preferences) {
        *self.inner.write() = preferences;
    }

    /// Edits the snapshot in place.
    pub fn update(&self, f: impl FnOnce(&mut Preferences)) {
        f(&mut self.inner.write());
    }
}

impl PreferencesProvider for SharedPreferences {
    fn preferences(&self) -> Preferences {
        self.inner.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_are_visible_to_clones() {
        let shared = SharedPreferences::default();
        let reader = shared.clone();
        assert!(!reader.preferences().scripting_enabled);

        shared.update(|p| p.scripting_enabled = true);
        assert!(reader.preferences().scripting_enabled);

        shared.replace(Preferences {
            request_timeout_sec: 5,
            ..Preferences::default()
        });
        assert_eq!(reader.preferences().request_timeout_sec, 5);
        assert!(!reader.preferences().scripting_enabled);
    }
}
