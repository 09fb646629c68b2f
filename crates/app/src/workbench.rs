//! Workbench file: the requests, collections, environments and global
//! variables a dispatch runs against.

use std::path::Path;

use courier_domain::{Collection, Environment, Request};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Error type for workbench files.
#[derive(Debug, thiserror::Error)]
pub enum WorkbenchError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a valid workbench.
    #[error("invalid workbench: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything stored in one workbench file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workbench {
    /// Stored requests
    #[serde(default)]
    pub requests: Vec<Request>,
    /// Collections
    #[serde(default)]
    pub collections: Vec<Collection>,
    /// Environments
    #[serde(default)]
    pub environments: Vec<Environment>,
    /// Global variables
    #[serde(default)]
    pub variables: IndexMap<String, String>,
}

impl Workbench {
    /// Reads a workbench from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, WorkbenchError> {
        let content = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&content)?)
    }

    /// Writes the workbench to `path` as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<(), WorkbenchError> {
        let content = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
