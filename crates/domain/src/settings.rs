//! Send-time preferences
//!
//! A snapshot of the global preferences every sender reads on each call.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// HTTP protocol version used by the HTTP and GraphQL senders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HttpVersion {
    /// HTTP/1.1 only (default).
    #[default]
    #[serde(rename = "http/1.1")]
    Http1,
    /// HTTP/2 with prior knowledge.
    #[serde(rename = "http/2")]
    Http2,
}

/// Global send-time preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Request timeout in seconds (0 disables the timeout).
    #[serde(default = "default_timeout_sec")]
    pub request_timeout_sec: u64,

    /// Maximum accepted response body size in megabytes (0 disables the limit).
    #[serde(default = "default_max_response_size_mb")]
    pub max_response_size_mb: u64,

    /// HTTP version preference.
    #[serde(default)]
    pub http_version: HttpVersion,

    /// Whether to send `Cache-Control: no-cache`.
    #[serde(default)]
    pub send_no_cache_header: bool,

    /// Whether to send the client's `User-Agent`.
    #[serde(default = "default_true")]
    pub send_agent_header: bool,

    /// Whether post-request scripts run.
    #[serde(default)]
    pub scripting_enabled: bool,
}

const fn default_timeout_sec() -> u64 {
    30
}

const fn default_max_response_size_mb() -> u64 {
    10
}

const fn default_true() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            request_timeout_sec: default_timeout_sec(),
            max_response_size_mb: default_max_response_size_mb(),
            http_version: HttpVersion::default(),
            send_no_cache_header: false,
            send_agent_header: true,
            scripting_enabled: false,
        }
    }
}

impl Preferences {
    /// Request timeout, `None` when disabled.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        if self.request_timeout_sec == 0 {
            None
        } else {
            Some(Duration::from_secs(self.request_timeout_sec))
        }
    }

    /// Maximum response body size in bytes, `None` when unlimited.
    #[must_use]
    pub const fn max_response_bytes(&self) -> Option<u64> {
        if self.max_response_size_mb == 0 {
            None
        } else {
            Some(self.max_response_size_mb.saturating_mul(1024 * 1024))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_preferences() {
        let prefs = Preferences::default();
        assert_eq!(prefs.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(prefs.max_response_bytes(), Some(10 * 1024 * 1024));
        assert_eq!(prefs.http_version, HttpVersion::Http1);
        assert!(prefs.send_agent_header);
        assert!(!prefs.scripting_enabled);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let prefs: Preferences =
            serde_json::from_str(r#"{"http_version":"http/2","request_timeout_sec":0}"#).unwrap();
        assert_eq!(prefs.http_version, HttpVersion::Http2);
        assert_eq!(prefs.timeout(), None);
        assert_eq!(prefs.max_response_size_mb, 10);
    }

    #[test]
    fn zero_response_size_is_unlimited() {
        let prefs = Preferences {
            max_response_size_mb: 0,
            ..Preferences::default()
        };
        assert_eq!(prefs.max_response_bytes(), None);
    }
}
