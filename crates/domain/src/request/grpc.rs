//! gRPC request spec

use serde::{Deserialize, Serialize};

use crate::auth::Auth;
use crate::error::{DomainError, DomainResult};
use crate::key_value::KeyValue;

/// gRPC protocol spec of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GrpcRequestSpec {
    /// Server address, e.g. `http://localhost:50051`
    pub address: String,
    /// Fully qualified service name, e.g. `helloworld.Greeter`
    pub service: String,
    /// Method name, e.g. `SayHello`
    pub method: String,
    /// Request metadata
    #[serde(default)]
    pub metadata: Vec<KeyValue>,
    /// Request message as JSON text
    #[serde(default)]
    pub body: String,
    /// Inline `.proto` schema declaring the service
    #[serde(default)]
    pub proto: String,
    /// Authentication, rendered into metadata
    #[serde(default)]
    pub auth: Auth,
}

impl GrpcRequestSpec {
    /// Returns the `/package.Service/Method` path of the call.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/{}/{}", self.service, self.method)
    }

    /// Validates the call target and returns the message body, defaulting to `{}`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIdentifier` when the service or method is blank, and
    /// `InvalidMessageJson` when the body is not JSON.
    pub fn message(&self) -> DomainResult<serde_json::Value> {
        if self.service.trim().is_empty() {
            return Err(DomainError::InvalidIdentifier("grpc service".to_string()));
        }
        if self.method.trim().is_empty() {
            return Err(DomainError::InvalidIdentifier("grpc method".to_string()));
        }
        let body = self.body.trim();
        if body.is_empty() {
            return Ok(serde_json::Value::Object(serde_json::Map::new()));
        }
        serde_json::from_str(body).map_err(|e| DomainError::InvalidMessageJson(e.to_string()))
    }
}
