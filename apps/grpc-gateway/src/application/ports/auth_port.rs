//! Authentication Ports
//!
//! Credentials check, token minting/validation, and the narrower validator
//! the auth middleware depends on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::errors::{TokenError, UseCaseError};
use crate::domain::identity::{Principal, User};

/// Claims resolved from a valid token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject user id.
    pub user_id: String,
    /// Subject email, when the token carries one.
    pub email: Option<String>,
    /// Expiry, when the token service tracks one.
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenClaims {
    /// Claims carrying only a user id.
    #[must_use]
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            expires_at: None,
        }
    }

    /// Expiry as unix seconds, 0 when unknown.
    #[must_use]
    pub fn expires_at_unix(&self) -> i64 {
        self.expires_at.map_or(0, |at| at.timestamp())
    }
}

/// Verifies credentials.
#[async_trait]
pub trait LoginUseCase: Send + Sync {
    /// Resolve an email/password pair to a user.
    ///
    /// Returns [`UseCaseError::InvalidCredentials`] when the pair does not match.
    async fn execute(&self, email: &str, password: &str) -> Result<User, UseCaseError>;
}

/// Mints and validates bearer tokens.
#[async_trait]
pub trait TokenService: Send + Sync {
    /// Create a token for the given user.
    async fn create_token(&self, email: &str, user_id: &str) -> Result<String, UseCaseError>;

    /// Validate a token and return its claims.
    async fn validate_token(&self, token: &str) -> Result<TokenClaims, TokenError>;
}

/// Resolves a bearer token to the calling principal.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Validate `token` (already stripped of any `Bearer ` prefix).
    async fn validate(&self, token: &str) -> Result<Principal, TokenError>;
}
