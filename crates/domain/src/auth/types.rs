//! Authentication configuration types

use serde::{Deserialize, Serialize};

/// Authentication configuration for a request or a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Auth {
    /// Use the parent collection's auth at dispatch time
    Inherit,
    /// No authentication
    #[default]
    None,
    /// Basic authentication
    Basic {
        /// Username (may contain variables)
        #[serde(default)]
        username: String,
        /// Password (may contain variables)
        #[serde(default)]
        password: String,
    },
    /// Bearer token authentication
    Token {
        /// The bearer token (may contain variables like `{{access_token}}`)
        #[serde(default)]
        token: String,
    },
    /// API key sent as a header
    ApiKey {
        /// Header name
        #[serde(default)]
        key: String,
        /// Header value
        #[serde(default)]
        value: String,
    },
}

/// A fully configured credential, ready to be rendered onto the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCredential {
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// `Authorization: Basic base64(username:password)`
    Basic {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
    /// A custom header.
    Header {
        /// Header name.
        name: String,
        /// Header value.
        value: String,
    },
}

impl Auth {
    /// Creates a bearer token authentication.
    #[must_use]
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token {
            token: token.into(),
        }
    }

    /// Creates a basic authentication.
    #[must_use]
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Creates an API key authentication.
    #[must_use]
    pub fn api_key(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ApiKey {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns true if this is the inherit sentinel.
    #[must_use]
    pub const fn is_inherit(&self) -> bool {
        matches!(self, Self::Inherit)
    }

    /// Returns the credential to send, if every required field is set.
    ///
    /// Partially configured auth yields `None` rather than an error.
    #[must_use]
    pub fn credential(&self) -> Option<AuthCredential> {
        match self {
            Self::Token { token } if !token.is_empty() => {
                Some(AuthCredential::Bearer(token.clone()))
            }
            Self::Basic { username, password } if !username.is_empty() && !password.is_empty() => {
                Some(AuthCredential::Basic {
                    username: username.clone(),
                    password: password.clone(),
                })
            }
            Self::ApiKey { key, value } if !key.is_empty() && !value.is_empty() => {
                Some(AuthCredential::Header {
                    name: key.clone(),
                    value: value.clone(),
                })
            }
            _ => None,
        }
    }

    /// Applies `f` to every credential string field.
    pub fn map_fields(&mut self, mut f: impl FnMut(&str) -> String) {
        match self {
            Self::Inherit | Self::None => {}
            Self::Basic { username, password } => {
                *username = f(username);
                *password = f(password);
            }
            Self::Token { token } => *token = f(token),
            Self::ApiKey { key, value } => {
                *key = f(key);
                *value = f(value);
            }
        }
    }
}

/// Resolves the effective auth of a request.
///
/// `Inherit` takes the collection's auth verbatim (including `None`), and
/// resolves to `None` when the request has no collection. A collection
/// whose own auth is `Inherit` has nothing to inherit from and also yields
/// `None`.
#[must_use]
pub fn resolve_auth(own: &Auth, collection: Option<&Auth>) -> Auth {
    match (own, collection) {
        (Auth::Inherit, Some(Auth::Inherit) | None) => Auth::None,
        (Auth::Inherit, Some(parent)) => parent.clone(),
        (own, _) => own.clone(),
    }
}
