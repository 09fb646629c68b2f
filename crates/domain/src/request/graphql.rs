//! GraphQL request spec

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::auth::Auth;
use crate::error::{DomainError, DomainResult};
use crate::key_value::KeyValue;

/// GraphQL protocol spec of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GraphQlRequestSpec {
    /// Endpoint URL
    pub url: String,
    /// Query document
    #[serde(default)]
    pub query: String,
    /// Variables as JSON text (empty or `{}` means no variables)
    #[serde(default)]
    pub variables: String,
    /// Request headers
    #[serde(default)]
    pub headers: Vec<KeyValue>,
    /// Authentication
    #[serde(default)]
    pub auth: Auth,
}

impl GraphQlRequestSpec {
    /// Parses the variables text.
    ///
    /// Returns `Ok(None)` when there are no variables to send.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidVariablesJson` if the text is not a JSON
    /// object.
    pub fn variables_object(&self) -> DomainResult<Option<Map<String, Value>>> {
        let text = self.variables.trim();
        if text.is_empty() || text == "{}" {
            return Ok(None);
        }
        serde_json::from_str::<Map<String, Value>>(text)
            .map(Some)
            .map_err(|e| DomainError::InvalidVariablesJson(e.to_string()))
    }

    /// Builds the `{"query", "variables"}` envelope sent on the wire.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidVariablesJson` if the variables text is
    /// malformed.
    pub fn envelope(&self) -> DomainResult<Value> {
        let mut body = Map::new();
        body.insert("query".to_string(), Value::String(self.query.clone()));
        if let Some(variables) = self.variables_object()? {
            body.insert("variables".to_string(), Value::Object(variables));
        }
        Ok(Value::Object(body))
    }
}
