//! JSON-path port

use serde_json::Value;

use crate::error::DispatchResult;

/// Evaluates a JSON-path query against a document.
pub trait JsonPathEvaluator: Send + Sync {
    /// Returns the value at `path`, or `None` if nothing matches.
    ///
    /// # Errors
    ///
    /// Returns `Extraction` if the path cannot be parsed.
    fn get(&self, document: &Value, path: &str) -> DispatchResult<Option<Value>>;
}
