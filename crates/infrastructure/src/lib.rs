//! Courier Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer: the protocol senders, the registry,
//! JSON-path evaluation, the script DSL, preferences and notification.

pub mod auth;
pub mod http;
pub mod jsonpath;
pub mod notifier;
pub mod preferences;
pub mod registry;
pub mod scripting;
pub mod senders;

pub use auth::auth_header;
pub use http::{BodyBuildError, BuiltBody, build_body};
pub use jsonpath::{JsonPathError, SimpleJsonPath};
pub use notifier::TracingNotifier;
pub use preferences::{PreferencesError, PreferencesRepository, SharedPreferences};
pub use registry::{EnvironmentListener, InMemoryRegistry};
pub use scripting::{DslScriptExecutor, ParseError, parse_script};
pub use senders::{AGENT_NAME, GraphQlSender, GrpcSender, HttpSender};
