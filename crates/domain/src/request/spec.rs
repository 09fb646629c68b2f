//! Stored request definition

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{GraphQlRequestSpec, GrpcRequestSpec, HttpRequestSpec};
use crate::auth::Auth;
use crate::environment::UpdateSource;
use crate::hooks::{ExtractRule, PostRequest, PreRequest};
use crate::id::generate_id;
use crate::key_value::KeyValue;

/// Protocol kind of a request. Dispatch selects its sender by this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    /// Plain HTTP
    #[serde(rename = "http")]
    Http,
    /// GraphQL over HTTP
    #[serde(rename = "graphql")]
    GraphQl,
    /// gRPC
    #[serde(rename = "grpc")]
    Grpc,
}

impl RequestKind {
    /// Returns the kind as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::GraphQl => "graphql",
            Self::Grpc => "grpc",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RequestKind> for UpdateSource {
    fn from(kind: RequestKind) -> Self {
        match kind {
            RequestKind::Http => Self::Http,
            RequestKind::GraphQl => Self::GraphQl,
            RequestKind::Grpc => Self::Grpc,
        }
    }
}

/// Protocol-specific part of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "protocol")]
pub enum ProtocolSpec {
    /// HTTP request
    #[serde(rename = "http")]
    Http(HttpRequestSpec),
    /// GraphQL request
    #[serde(rename = "graphql")]
    GraphQl(GraphQlRequestSpec),
    /// gRPC request
    #[serde(rename = "grpc")]
    Grpc(GrpcRequestSpec),
}

impl ProtocolSpec {
    /// Returns the protocol kind.
    #[must_use]
    pub const fn kind(&self) -> RequestKind {
        match self {
            Self::Http(_) => RequestKind::Http,
            Self::GraphQl(_) => RequestKind::GraphQl,
            Self::Grpc(_) => RequestKind::Grpc,
        }
    }

    /// Headers for HTTP and GraphQL, metadata for gRPC.
    #[must_use]
    pub fn headers(&self) -> &[KeyValue] {
        match self {
            Self::Http(spec) => &spec.headers,
            Self::GraphQl(spec) => &spec.headers,
            Self::Grpc(spec) => &spec.metadata,
        }
    }

    /// Mutable access to the headers (metadata for gRPC).
    pub const fn headers_mut(&mut self) -> &mut Vec<KeyValue> {
        match self {
            Self::Http(spec) => &mut spec.headers,
            Self::GraphQl(spec) => &mut spec.headers,
            Self::Grpc(spec) => &mut spec.metadata,
        }
    }

    /// The request's own auth.
    #[must_use]
    pub const fn auth(&self) -> &Auth {
        match self {
            Self::Http(spec) => &spec.auth,
            Self::GraphQl(spec) => &spec.auth,
            Self::Grpc(spec) => &spec.auth,
        }
    }

    /// Mutable access to the auth.
    pub const fn auth_mut(&mut self) -> &mut Auth {
        match self {
            Self::Http(spec) => &mut spec.auth,
            Self::GraphQl(spec) => &mut spec.auth,
            Self::Grpc(spec) => &mut spec.auth,
        }
    }
}

/// A stored request definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Unique identifier
    #[serde(default = "generate_id")]
    pub id: String,
    /// Display name
    pub name: String,
    /// Parent collection, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    /// Protocol-specific spec
    #[serde(flatten)]
    pub spec: ProtocolSpec,
    /// Hook run before sending
    #[serde(default)]
    pub pre_request: PreRequest,
    /// Hook run after the response
    #[serde(default)]
    pub post_request: PostRequest,
    /// Variable extraction rules, in order
    #[serde(default)]
    pub extract: Vec<ExtractRule>,
}

impl Request {
    /// Creates a request with no collection and no hooks.
    #[must_use]
    pub fn new(name: impl Into<String>, spec: ProtocolSpec) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            collection_id: None,
            spec,
            pre_request: PreRequest::None,
            post_request: PostRequest::None,
            extract: Vec::new(),
        }
    }

    /// Sets the id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Places the request in a collection.
    #[must_use]
    pub fn in_collection(mut self, collection_id: impl Into<String>) -> Self {
        self.collection_id = Some(collection_id.into());
        self
    }

    /// Sets the pre-request hook.
    #[must_use]
    pub fn with_pre_request(mut self, hook: PreRequest) -> Self {
        self.pre_request = hook;
        self
    }

    /// Sets the post-request hook.
    #[must_use]
    pub fn with_post_request(mut self, hook: PostRequest) -> Self {
        self.post_request = hook;
        self
    }

    /// Appends an extraction rule.
    #[must_use]
    pub fn with_extract(mut self, rule: ExtractRule) -> Self {
        self.extract.push(rule);
        self
    }

    /// Returns the protocol kind.
    #[must_use]
    pub const fn kind(&self) -> RequestKind {
        self.spec.kind()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::request::HttpMethod;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_json_layout() {
        let json = r#"{
            "id": "r1",
            "name": "Ping",
            "collection_id": "c1",
            "protocol": "http",
            "method": "GET",
            "url": "https://{{host}}/ping",
            "auth": {"type": "inherit"}
        }"#;
        let request: Request = serde_json::from_str(json).unwrap();

        assert_eq!(request.kind(), RequestKind::Http);
        assert_eq!(request.collection_id.as_deref(), Some("c1"));
        assert!(request.spec.auth().is_inherit());
        let ProtocolSpec::Http(spec) = &request.spec else {
            unreachable!()
        };
        assert_eq!(spec.method, HttpMethod::Get);
        assert_eq!(request.pre_request, PreRequest::None);
    }

    #[test]
    fn test_grpc_headers_are_metadata() {
        let mut spec = ProtocolSpec::Grpc(GrpcRequestSpec::default());
        spec.headers_mut().push(KeyValue::new("x-trace", "1"));
        assert_eq!(spec.headers().len(), 1);
        assert_eq!(spec.kind().to_string(), "grpc");
    }
}
