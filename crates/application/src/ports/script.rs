//! Script executor port

use async_trait::async_trait;
use courier_domain::{Environment, RequestKind, Response};
use indexmap::IndexMap;
use serde_json::Value;

use crate::error::DispatchResult;

/// What a script sees of the request that was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestView {
    /// Request id
    pub id: String,
    /// Display name
    pub name: String,
    /// Protocol kind
    pub kind: RequestKind,
    /// URL or gRPC address after substitution
    pub url: String,
    /// HTTP method, or the gRPC `/Service/Method` path
    pub method: String,
    /// Headers as sent
    pub headers: IndexMap<String, String>,
}

/// What a script sees of the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseView {
    /// Status code
    pub status_code: u16,
    /// Response headers
    pub headers: IndexMap<String, String>,
    /// Body text
    pub body: String,
}

impl From<&Response> for ResponseView {
    fn from(response: &Response) -> Self {
        Self {
            status_code: response.status_code,
            headers: response.response_headers.clone(),
            body: response.body_text().into_owned(),
        }
    }
}

/// Inputs of one script run.
#[derive(Debug, Clone)]
pub struct ScriptParams {
    /// Active environment, if any
    pub environment: Option<Environment>,
    /// Global variables, shadowed by environment entries of the same name
    pub globals: IndexMap<String, String>,
    /// The request
    pub request: RequestView,
    /// The response
    pub response: ResponseView,
}

/// Result of one script run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptOutcome {
    /// Environment assignments requested by the script
    pub set_environments: IndexMap<String, Value>,
    /// Lines printed by the script, in order
    pub prints: Vec<String>,
}

impl ScriptOutcome {
    /// Assignments whose value is a string; other types are not written.
    pub fn string_assignments(&self) -> impl Iterator<Item = (&str, &str)> {
        self.set_environments
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.as_str(), s)))
    }
}

/// Runs post-request scripts.
#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    /// Executes `script` with `params`.
    ///
    /// # Errors
    ///
    /// Returns `ScriptExecution` if the script fails to parse or run.
    async fn execute(&self, script: &str, params: ScriptParams) -> DispatchResult<ScriptOutcome>;
}
