//! Normalized response
//!
//! The single shape produced by every protocol backend. HTTP fills headers
//! and cookies, gRPC fills metadata and trailers, GraphQL fills headers only.

use std::borrow::Cow;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use super::Cookie;
use crate::hooks::ResponseSource;
use crate::json::pretty_json;
use crate::key_value::KeyValue;

/// Normalized response of one send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Response {
    /// HTTP status code, or the gRPC status code (0 = OK) for gRPC.
    pub status_code: u16,
    /// Status text (e.g. "OK", "NOT_FOUND").
    pub status: String,
    /// Response headers, multi-values comma-joined.
    pub response_headers: IndexMap<String, String>,
    /// Request headers as actually sent.
    pub request_headers: IndexMap<String, String>,
    /// Cookies set by the response.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cookies: Vec<Cookie>,
    /// gRPC metadata as sent.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub request_metadata: Vec<KeyValue>,
    /// gRPC response metadata (initial headers).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub response_metadata: Vec<KeyValue>,
    /// gRPC trailers.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trailers: Vec<KeyValue>,
    /// Raw body bytes.
    #[serde(serialize_with = "lossy_text")]
    pub body: Vec<u8>,
    /// Pretty-printed body, empty unless `is_json`.
    pub json: String,
    /// Whether the body parsed as JSON.
    pub is_json: bool,
    /// Body size in bytes.
    pub size: usize,
    /// Wall-clock time of the round trip.
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
    /// Error reported by the far end without failing the send (gRPC status).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    /// Creates a response from a status code and body, rendering JSON if possible.
    #[must_use]
    pub fn new(status_code: u16, body: Vec<u8>, elapsed: Duration) -> Self {
        let json = pretty_json(&body);
        Self {
            status_code,
            size: body.len(),
            is_json: json.is_some(),
            json: json.unwrap_or_default(),
            body,
            elapsed,
            ..Self::default()
        }
    }

    /// Sets the status text.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Adds a response header, joining with any existing value for the same name.
    pub fn append_header(&mut self, name: &str, value: &str) {
        append_joined(&mut self.response_headers, name, value);
    }

    /// Adds a request header, joining with any existing value for the same name.
    pub fn append_request_header(&mut self, name: &str, value: &str) {
        append_joined(&mut self.request_headers, name, value);
    }

    /// Body decoded as UTF-8, lossily.
    #[must_use]
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Case-insensitive response header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.response_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Cookie lookup by exact name.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }

    /// Case-insensitive response metadata lookup.
    #[must_use]
    pub fn metadata(&self, name: &str) -> Option<&str> {
        find_kv(&self.response_metadata, name)
    }

    /// Case-insensitive trailer lookup.
    #[must_use]
    pub fn trailer(&self, name: &str) -> Option<&str> {
        find_kv(&self.trailers, name)
    }

    /// Looks up `key` in a non-body source.
    ///
    /// Body values need a JSON-path evaluator and always return `None` here.
    #[must_use]
    pub fn source_value(&self, source: ResponseSource, key: &str) -> Option<&str> {
        match source {
            ResponseSource::Body => None,
            ResponseSource::Header => self.header(key),
            ResponseSource::Cookie => self.cookie(key),
            ResponseSource::Metadata => self.metadata(key),
            ResponseSource::Trailers => self.trailer(key),
        }
    }
}

fn find_kv<'a>(items: &'a [KeyValue], name: &str) -> Option<&'a str> {
    items
        .iter()
        .find(|kv| kv.key.eq_ignore_ascii_case(name))
        .map(|kv| kv.value.as_str())
}

fn append_joined(map: &mut IndexMap<String, String>, name: &str, value: &str) {
    map.entry(name.to_string())
        .and_modify(|existing| {
            existing.push_str(", ");
            existing.push_str(value);
        })
        .or_insert_with(|| value.to_string());
}

fn lossy_text<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(body))
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_renders_json() {
        let response = Response::new(200, br#"{"ok":true}"#.to_vec(), Duration::from_millis(5));
        assert!(response.is_json);
        assert_eq!(response.json, "{\n    \"ok\": true\n}");
        assert_eq!(response.size, 11);
    }

    #[test]
    fn test_new_plain_text() {
        let response = Response::new(200, b"pong".to_vec(), Duration::ZERO);
        assert!(!response.is_json);
        assert_eq!(response.json, "");
        assert_eq!(response.body_text(), "pong");
    }

    #[test]
    fn test_headers_join_multi_values() {
        let mut response = Response::new(200, Vec::new(), Duration::ZERO);
        response.append_header("Vary", "Accept");
        response.append_header("Vary", "Origin");
        assert_eq!(response.header("vary"), Some("Accept, Origin"));
    }

    #[test]
    fn test_source_value() {
        let mut response = Response::new(0, Vec::new(), Duration::ZERO);
        response.append_header("X-Token", "t1");
        response.cookies.push(Cookie::new("sid", "s1"));
        response.response_metadata.push(KeyValue::new("x-request-id", "m1"));
        response.trailers.push(KeyValue::new("grpc-status-details", "d1"));

        assert_eq!(response.source_value(ResponseSource::Header, "x-token"), Some("t1"));
        assert_eq!(response.source_value(ResponseSource::Cookie, "sid"), Some("s1"));
        assert_eq!(
            response.source_value(ResponseSource::Metadata, "X-Request-Id"),
            Some("m1")
        );
        assert_eq!(
            response.source_value(ResponseSource::Trailers, "grpc-status-details"),
            Some("d1")
        );
        assert_eq!(response.source_value(ResponseSource::Body, "$.id"), None);
    }
}
