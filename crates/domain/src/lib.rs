//! Courier Domain - Core types of the request-dispatch pipeline
//!
//! This crate defines the data model shared by every protocol backend:
//! requests, collections, environments, hooks, extraction rules and the
//! normalized response. All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod collection;
pub mod environment;
pub mod error;
pub mod hooks;
pub mod id;
pub mod json;
pub mod key_value;
pub mod request;
pub mod response;
pub mod settings;
pub mod state;

pub use auth::{Auth, AuthCredential, resolve_auth};
pub use collection::Collection;
pub use environment::{Environment, UpdateSource};
pub use error::{DomainError, DomainResult};
pub use hooks::{ExtractRule, PostRequest, PreRequest, ResponseSource, SetEnvironmentRule};
pub use id::generate_id;
pub use json::pretty_json;
pub use key_value::{KeyValue, merge_key_values};
pub use request::{
    FormField, FormFieldKind, GraphQlRequestSpec, GrpcRequestSpec, HttpBody, HttpMethod,
    HttpRequestSpec, ProtocolSpec, Request, RequestKind,
};
pub use response::{Cookie, Response};
pub use settings::{HttpVersion, Preferences};
pub use state::DispatchPhase;
