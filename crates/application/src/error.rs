//! Dispatch error types

use std::fmt;

use courier_domain::{DomainError, RequestKind};
use thiserror::Error;

/// Kind of registry entity a lookup can miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A stored request.
    Request,
    /// A collection.
    Collection,
    /// An environment.
    Environment,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Request => "request",
            Self::Collection => "collection",
            Self::Environment => "environment",
        })
    }
}

/// Errors that abort a dispatch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// A registry lookup missed.
    #[error("{kind} with id {id} not found")]
    NotFound {
        /// What was looked up.
        kind: EntityKind,
        /// The id that missed.
        id: String,
    },

    /// No sender is registered for the request's protocol.
    #[error("unknown request type: {0}")]
    UnknownRequestType(RequestKind),

    /// GraphQL variables text is not a JSON object.
    #[error("invalid variables JSON: {0}")]
    InvalidVariablesJson(String),

    /// The request could not be built (bad URL, schema or message).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request body could not be assembled.
    #[error("request body error: {0}")]
    RequestBody(String),

    /// Network, connection or timeout failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be read.
    #[error("body read error: {0}")]
    BodyRead(String),

    /// A post-request script failed.
    #[error("script execution error: {0}")]
    ScriptExecution(String),

    /// A value could not be extracted from the response.
    #[error("extraction error: {0}")]
    Extraction(String),

    /// A trigger-request chain revisits a request or is too deep.
    #[error("cyclic trigger request chain: {}", chain.join(" -> "))]
    CyclicTrigger {
        /// Request ids in dispatch order, ending with the offending id.
        chain: Vec<String>,
    },

    /// A registry write failed.
    #[error("registry error: {0}")]
    Registry(String),

    /// The dispatch was cancelled by the caller.
    #[error("dispatch cancelled")]
    Cancelled,
}

impl DispatchError {
    /// Creates a `NotFound` error.
    #[must_use]
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

impl From<DomainError> for DispatchError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidVariablesJson(msg) => Self::InvalidVariablesJson(msg),
            other => Self::InvalidRequest(other.to_string()),
        }
    }
}

/// Result type alias for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
