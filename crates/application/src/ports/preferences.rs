//! Preferences port

use courier_domain::Preferences;

/// Source of the global send-time preferences.
pub trait PreferencesProvider: Send + Sync {
    /// Returns the current preferences.
    fn preferences(&self) -> Preferences;
}
