//! HTTP request spec: method, URL, params and body

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::auth::Auth;
use crate::error::{DomainError, DomainResult};
use crate::id::generate_id;
use crate::key_value::KeyValue;

/// Supported HTTP methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// HTTP GET method
    #[default]
    Get,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP PATCH method
    Patch,
    /// HTTP DELETE method
    Delete,
    /// HTTP HEAD method
    Head,
    /// HTTP OPTIONS method
    Options,
}

impl HttpMethod {
    /// Returns the method as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            other => Err(DomainError::UnsupportedMethod(other.to_string())),
        }
    }
}

/// Kind of a multipart form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FormFieldKind {
    /// Plain text value
    #[default]
    Text,
    /// Value is a path to a file to upload
    File,
}

/// A multipart form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    /// Unique identifier
    #[serde(default = "generate_id")]
    pub id: String,
    /// Field name
    pub key: String,
    /// Text value or file path
    #[serde(default)]
    pub value: String,
    /// Text or file
    #[serde(default)]
    pub kind: FormFieldKind,
    /// Whether the field is sent
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_enabled() -> bool {
    true
}

impl FormField {
    /// Creates an enabled text field.
    #[must_use]
    pub fn text(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            key: key.into(),
            value: value.into(),
            kind: FormFieldKind::Text,
            enabled: true,
        }
    }

    /// Creates an enabled file field.
    #[must_use]
    pub fn file(key: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind: FormFieldKind::File,
            ..Self::text(key, path)
        }
    }
}

/// HTTP request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HttpBody {
    /// No body
    #[default]
    None,
    /// JSON text
    Json {
        /// Raw JSON text
        data: String,
    },
    /// XML text
    Xml {
        /// Raw XML text
        data: String,
    },
    /// Plain text
    Text {
        /// Raw text
        data: String,
    },
    /// `application/x-www-form-urlencoded`
    UrlEncoded {
        /// Form fields
        fields: Vec<KeyValue>,
    },
    /// `multipart/form-data`
    FormData {
        /// Form fields
        fields: Vec<FormField>,
    },
    /// Raw bytes read from a file
    Binary {
        /// File path
        path: String,
    },
}

impl HttpBody {
    /// Creates a JSON body.
    #[must_use]
    pub fn json(data: impl Into<String>) -> Self {
        Self::Json { data: data.into() }
    }

    /// Creates a plain text body.
    #[must_use]
    pub fn text(data: impl Into<String>) -> Self {
        Self::Text { data: data.into() }
    }

    /// Returns the content type implied by the body kind.
    ///
    /// Multipart returns `None`: the boundary is chosen when the form is built.
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::None | Self::FormData { .. } => None,
            Self::Json { .. } => Some("application/json"),
            Self::Xml { .. } => Some("application/xml"),
            Self::Text { .. } => Some("text/plain"),
            Self::UrlEncoded { .. } => Some("application/x-www-form-urlencoded"),
            Self::Binary { .. } => Some("application/octet-stream"),
        }
    }

    /// Applies `f` to every user-editable text of the body.
    pub fn map_text(&mut self, mut f: impl FnMut(&str) -> String) {
        match self {
            Self::None => {}
            Self::Json { data } | Self::Xml { data } | Self::Text { data } => *data = f(data),
            Self::UrlEncoded { fields } => {
                for field in fields {
                    field.value = f(&field.value);
                }
            }
            Self::FormData { fields } => {
                for field in fields {
                    field.value = f(&field.value);
                }
            }
            Self::Binary { path } => *path = f(path),
        }
    }
}

/// HTTP protocol spec of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HttpRequestSpec {
    /// HTTP method
    #[serde(default)]
    pub method: HttpMethod,
    /// URL template (may contain `{{variables}}` and `{path}` params)
    pub url: String,
    /// Request headers
    #[serde(default)]
    pub headers: Vec<KeyValue>,
    /// Query parameters appended to the URL
    #[serde(default)]
    pub query_params: Vec<KeyValue>,
    /// Path parameters replacing `{name}` segments
    #[serde(default)]
    pub path_params: Vec<KeyValue>,
    /// Request body
    #[serde(default)]
    pub body: HttpBody,
    /// Authentication
    #[serde(default)]
    pub auth: Auth,
}

impl HttpRequestSpec {
    /// Creates a spec with the given method and URL.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Self::default()
        }
    }
}
