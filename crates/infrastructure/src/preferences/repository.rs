//! Preferences persistence.
//!
//! Stores preferences in the platform-specific config directory:
//! - Linux: ~/.config/courier/preferences.json
//! - macOS: ~/Library/Application Support/courier/preferences.json
//! - Windows: %APPDATA%/courier/preferences.json

use std::path::{Path, PathBuf};

use courier_domain::Preferences;
use tokio::fs;

/// Error type for preferences operations.
#[derive(Debug, thiserror::Error)]
pub enum PreferencesError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid preferences JSON.
    #[error("invalid preferences file: {0}")]
    Json(#[from] serde_json::Error),

    /// Could not determine config directory.
    #[error("could not determine config directory")]
    NoConfigDir,
}

/// Loads and saves [`Preferences`] as JSON.
#[derive(Debug, Clone)]
pub struct PreferencesRepository {
    path: Option<PathBuf>,
}

impl Default for PreferencesRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferencesRepository {
    /// Uses the platform config directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: dirs::config_dir().map(|p| p.join("courier").join("preferences.json")),
        }
    }

    /// Uses an explicit file.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// The file backing this repository, if one could be determined.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Loads the preferences.
    ///
    /// Returns defaults if the file doesn't exist or no config dir is known.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<Preferences, PreferencesError> {
        let Some(path) = &self.path else {
            return Ok(Preferences::default());
        };
        if !fs::try_exists(path).await? {
            return Ok(Preferences::default());
        }
        let content = fs::read(path).await?;
        Ok(serde_json::from_slice(&content)?)
    }

    /// Saves the preferences, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if no config dir is known or the write fails.
    pub async fn save(&self, preferences: &Preferences) -> Result<(), PreferencesError> {
        let path = self.path.as_ref().ok_or(PreferencesError::NoConfigDir)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }
        let content = serde_json::to_vec_pretty(preferences)?;
        fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use courier_domain::HttpVersion;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_path_is_under_courier() {
        if let Some(path) = PreferencesRepository::new().path() {
            assert!(path.ends_with("courier/preferences.json"));
        }
    }

    #[tokio::test]
    async fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let repo = PreferencesRepository::at(dir.path().join("none.json"));
        assert_eq!(repo.load().await.unwrap(), Preferences::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let repo = PreferencesRepository::at(dir.path().join("nested").join("prefs.json"));
        let preferences = Preferences {
            http_version: HttpVersion::Http2,
            scripting_enabled: true,
            ..Preferences::default()
        };
        repo.save(&preferences).await.unwrap();
        assert_eq!(repo.load().await.unwrap(), preferences);
    }

    #[tokio::test]
    async fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, r#"{"request_timeout_sec": 3}"#).unwrap();

        let loaded = PreferencesRepository::at(&path).load().await.unwrap();
        assert_eq!(loaded.request_timeout_sec, 3);
        assert_eq!(loaded.max_response_size_mb, 10);
        assert!(loaded.send_agent_header);
    }

    #[tokio::test]
    async fn test_garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            PreferencesRepository::at(&path).load().await,
            Err(PreferencesError::Json(_))
        ));
    }
}
