//! Application Errors
//!
//! `UseCaseError` is the taxonomy every port reports failures in. The gRPC
//! layer maps each category to a status code inside the response envelope.

use thiserror::Error;

/// Failure reported by a use case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UseCaseError {
    /// Malformed or missing input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Unknown user or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The requested entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity ("order", "user", ...).
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// The entity exists but belongs to someone else.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The entity is in a state that forbids the operation.
    #[error("failed precondition: {0}")]
    FailedPrecondition(String),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl UseCaseError {
    /// Shorthand for [`UseCaseError::NotFound`].
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Failure validating a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// No token supplied.
    #[error("token is empty")]
    Empty,

    /// The token is unknown or malformed.
    #[error("token is invalid")]
    Invalid,

    /// The token was valid but has expired.
    #[error("token has expired")]
    Expired,

    /// The validator could not be reached.
    #[error("token validator unavailable: {0}")]
    Unavailable(String),
}
