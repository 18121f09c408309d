//! Identity Types
//!
//! `Principal` is the authenticated caller attached to a request by the auth
//! middleware. `User` is what the login use case resolves credentials to.

use serde::{Deserialize, Serialize};

/// Authenticated caller of a gRPC method.
///
/// The user id is never empty; construction rejects blank ids so a handler
/// holding a `Principal` can rely on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    user_id: String,
}

impl Principal {
    /// Create a principal, or `None` when the user id is blank.
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Option<Self> {
        let user_id = user_id.into();
        if user_id.trim().is_empty() {
            return None;
        }
        Some(Self { user_id })
    }

    /// The authenticated user id.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Whether the resource owned by `user_id` belongs to this principal.
    #[must_use]
    pub fn owns(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.user_id)
    }
}

/// A platform user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User id.
    pub id: String,
    /// Login email.
    pub email: String,
    /// Given name (may be empty).
    pub first_name: String,
    /// Family name (may be empty).
    pub last_name: String,
}

impl User {
    /// Create a user with only id and email.
    #[must_use]
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }
}
