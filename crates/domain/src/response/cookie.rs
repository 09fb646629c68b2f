//! Cookies reported by a response

use serde::{Deserialize, Serialize};

/// A cookie parsed from a `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Domain attribute (empty when not set).
    #[serde(default)]
    pub domain: String,
    /// Path attribute (defaults to "/").
    #[serde(default = "default_path")]
    pub path: String,
    /// `HttpOnly` flag.
    #[serde(default)]
    pub http_only: bool,
    /// Secure flag.
    #[serde(default)]
    pub secure: bool,
}

fn default_path() -> String {
    "/".to_string()
}

impl Cookie {
    /// Creates a cookie with default attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: default_path(),
            http_only: false,
            secure: false,
        }
    }

    /// Parses a `Set-Cookie` header value.
    ///
    /// Attributes other than domain, path, `HttpOnly` and Secure are ignored.
    #[must_use]
    pub fn from_set_cookie(header: &str) -> Option<Self> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let mut cookie = Self::new(name, value.trim().trim_matches('"'));

        for part in parts.map(str::trim) {
            match part.split_once('=') {
                Some((attr, val)) => match attr.trim().to_lowercase().as_str() {
                    "domain" => cookie.domain = val.trim().trim_start_matches('.').to_string(),
                    "path" => cookie.path = val.trim().to_string(),
                    _ => {}
                },
                None => match part.to_lowercase().as_str() {
                    "httponly" => cookie.http_only = true,
                    "secure" => cookie.secure = true,
                    _ => {}
                },
            }
        }

        Some(cookie)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_set_cookie() {
        let cookie =
            Cookie::from_set_cookie("sid=abc123; Path=/api; Domain=.example.com; HttpOnly; Secure")
                .unwrap();
        assert_eq!(cookie.name, "sid");
        assert_eq!(cookie.value, "abc123");
        assert_eq!(cookie.path, "/api");
        assert_eq!(cookie.domain, "example.com");
        assert!(cookie.http_only);
        assert!(cookie.secure);
    }

    #[test]
    fn test_from_set_cookie_rejects_garbage() {
        assert!(Cookie::from_set_cookie("no-equals-sign").is_none());
        assert!(Cookie::from_set_cookie("=value").is_none());
    }
}
