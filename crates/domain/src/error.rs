//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur while building or validating definitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A template uses the reserved `$` notation incorrectly.
    #[error("invalid template notation: {0}")]
    InvalidTemplate(String),

    /// A JSON type name is not one of the known type classes.
    #[error("unknown JSON type: {0}")]
    UnknownJsonType(String),

    /// The request body cannot be sent as JSON.
    #[error("invalid body: {0}")]
    InvalidBody(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
