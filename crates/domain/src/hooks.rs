//! Pre-request and post-request hooks and variable extraction rules.
//!
//! Hooks are sum types: each variant carries exactly the data it needs, so
//! a hook is either absent or of one concrete kind. A hook whose required
//! field is blank is accepted as configuration but is not "doable".

use serde::{Deserialize, Serialize};

use crate::id::generate_id;

/// Hook executed before a request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PreRequest {
    /// Nothing to do
    #[default]
    None,
    /// Dispatch another stored request first
    TriggerRequest {
        /// Id of the request to dispatch
        request_id: String,
    },
    /// Run a script (accepted, currently a no-op before sending)
    Script {
        /// Script source
        code: String,
    },
}

impl PreRequest {
    /// Returns true if the hook has a kind and its required field is set.
    #[must_use]
    pub fn is_doable(&self) -> bool {
        match self {
            Self::None => false,
            Self::TriggerRequest { request_id } => !request_id.trim().is_empty(),
            Self::Script { code } => !code.trim().is_empty(),
        }
    }

    /// Returns the id of the request to trigger, if this is a doable trigger.
    #[must_use]
    pub fn trigger_target(&self) -> Option<&str> {
        match self {
            Self::TriggerRequest { request_id } if self.is_doable() => Some(request_id),
            _ => None,
        }
    }
}

/// Hook executed after a response is received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PostRequest {
    /// Nothing to do
    #[default]
    None,
    /// Dispatch another stored request (accepted, currently a no-op)
    TriggerRequest {
        /// Id of the request to dispatch
        request_id: String,
    },
    /// Run a script against the response
    Script {
        /// Script source
        code: String,
    },
    /// Copy one value from the response into the environment
    SetEnvironment(SetEnvironmentRule),
}

impl PostRequest {
    /// Returns true if the hook has a kind and its required fields are set.
    #[must_use]
    pub fn is_doable(&self) -> bool {
        match self {
            Self::None => false,
            Self::TriggerRequest { request_id } => !request_id.trim().is_empty(),
            Self::Script { code } => !code.trim().is_empty(),
            Self::SetEnvironment(rule) => rule.is_valid(),
        }
    }

    /// Returns the script source, if this is a doable script hook.
    #[must_use]
    pub fn script(&self) -> Option<&str> {
        match self {
            Self::Script { code } if self.is_doable() => Some(code),
            _ => None,
        }
    }

    /// Returns the set-environment rule, if this is a valid one.
    #[must_use]
    pub fn set_environment(&self) -> Option<&SetEnvironmentRule> {
        match self {
            Self::SetEnvironment(rule) if rule.is_valid() => Some(rule),
            _ => None,
        }
    }
}

/// Where in a response a value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    /// JSON body, addressed by a JSON path
    #[default]
    Body,
    /// A response header
    Header,
    /// A response cookie
    Cookie,
    /// gRPC response metadata
    Metadata,
    /// gRPC trailers
    Trailers,
}

/// Explicit "set environment from response" rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetEnvironmentRule {
    /// Only applies when the response has this status code
    pub status_code: u16,
    /// Where to read the value
    pub from: ResponseSource,
    /// JSON path for `Body`, otherwise the header/cookie/metadata name
    pub from_key: String,
    /// Environment variable to write
    pub target: String,
}

impl SetEnvironmentRule {
    /// Returns true if both the source key and the target are set.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.from_key.trim().is_empty() && !self.target.trim().is_empty()
    }
}

/// A mapping from a response location to an environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractRule {
    /// Unique identifier
    #[serde(default = "generate_id")]
    pub id: String,
    /// Whether the rule runs
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Only applies when the response has this status code
    pub on_status_code: u16,
    /// Where to read the value
    pub from: ResponseSource,
    /// JSON path for `Body`, otherwise the header/cookie/metadata name
    pub source_key: String,
    /// Environment variable to write
    pub target: String,
}

const fn default_enabled() -> bool {
    true
}

impl ExtractRule {
    /// Creates an enabled rule.
    #[must_use]
    pub fn new(
        on_status_code: u16,
        from: ResponseSource,
        source_key: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_id(),
            enabled: true,
            on_status_code,
            from,
            source_key: source_key.into(),
            target: target.into(),
        }
    }

    /// Returns true if the rule is enabled and expects this status code.
    #[must_use]
    pub const fn applies_to(&self, status_code: u16) -> bool {
        self.enabled && self.on_status_code == status_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pre_request_doable() {
        assert!(!PreRequest::None.is_doable());
        assert!(
            !PreRequest::TriggerRequest {
                request_id: " ".to_string()
            }
            .is_doable()
        );
        let trigger = PreRequest::TriggerRequest {
            request_id: "login".to_string(),
        };
        assert_eq!(trigger.trigger_target(), Some("login"));
        assert_eq!(
            PreRequest::Script {
                code: "log(\"x\")".to_string()
            }
            .trigger_target(),
            None
        );
    }

    #[test]
    fn test_post_request_set_environment_validity() {
        let rule = SetEnvironmentRule {
            status_code: 200,
            from: ResponseSource::Header,
            from_key: String::new(),
            target: "token".to_string(),
        };
        let hook = PostRequest::SetEnvironment(rule);
        assert!(!hook.is_doable());
        assert!(hook.set_environment().is_none());
    }

    #[test]
    fn test_extract_rule_applies() {
        let mut rule = ExtractRule::new(200, ResponseSource::Header, "X-Token", "token");
        assert!(rule.applies_to(200));
        assert!(!rule.applies_to(201));
        rule.enabled = false;
        assert!(!rule.applies_to(200));
    }

    #[test]
    fn test_hook_serde() {
        let hook: PostRequest = serde_json::from_str(
            r#"{"type":"set_environment","status_code":200,"from":"cookie","from_key":"sid","target":"session"}"#,
        )
        .unwrap_or_default();
        assert_eq!(
            hook.set_environment().map(|r| r.from),
            Some(ResponseSource::Cookie)
        );
    }
}
