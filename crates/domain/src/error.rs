//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// GraphQL variables text is not a JSON object.
    #[error("invalid variables JSON: {0}")]
    InvalidVariablesJson(String),

    /// A gRPC message body is not valid JSON.
    #[error("invalid message JSON: {0}")]
    InvalidMessageJson(String),

    /// An identifier is invalid or empty.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
