//! Authentication Middleware
//!
//! A tower layer installed on the transport, so unary and streaming calls are
//! covered alike. For every call that is not allowlisted it:
//!
//! 1. Reads the `authorization` header (`Bearer ` prefix optional)
//! 2. Validates the token through a [`TokenValidator`]
//! 3. Inserts the resolved [`Principal`] into the request extensions
//!
//! Any failure answers `Unauthenticated` without reaching the handler.

use std::collections::HashSet;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use tonic::Status;
use tonic::codegen::BoxFuture;
use tonic::codegen::http::{HeaderMap, Request, Response};
use tower::{Layer, Service};

use crate::application::errors::TokenError;
use crate::application::ports::{TokenService, TokenValidator};
use crate::domain::identity::Principal;

/// Metadata key carrying the bearer token.
pub const AUTHORIZATION_HEADER: &str = "authorization";

const BEARER_PREFIX: &str = "Bearer ";

/// `AuthService/Login` path.
pub const LOGIN_METHOD: &str = "/hub.v1.AuthService/Login";

/// `AuthService/ValidateToken` path.
pub const VALIDATE_TOKEN_METHOD: &str = "/hub.v1.AuthService/ValidateToken";

// =============================================================================
// Method Policy
// =============================================================================

/// Allowlist of fully-qualified method paths that skip token validation.
#[derive(Debug, Clone)]
pub struct MethodPolicy {
    public: Arc<HashSet<String>>,
}

impl MethodPolicy {
    /// Policy with exactly the given public methods.
    pub fn new<I, S>(public: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            public: Arc::new(public.into_iter().map(Into::into).collect()),
        }
    }

    /// Policy where every method requires a token.
    #[must_use]
    pub fn deny_all() -> Self {
        Self::new(std::iter::empty::<String>())
    }

    /// Whether `path` (e.g. `/hub.v1.AuthService/Login`) skips validation.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public.contains(path)
    }
}

impl Default for MethodPolicy {
    /// Login and ValidateToken are public.
    fn default() -> Self {
        Self::new([LOGIN_METHOD, VALIDATE_TOKEN_METHOD])
    }
}

// =============================================================================
// Token Extraction
// =============================================================================

/// Strip an optional `Bearer ` prefix and surrounding whitespace.
///
/// A bare `Bearer` (the transport may drop the trailing space) is empty.
#[must_use]
pub fn strip_bearer(value: &str) -> &str {
    let value = value.trim_start();
    match value.strip_prefix(BEARER_PREFIX) {
        Some(token) => token.trim(),
        None if value.trim_end() == BEARER_PREFIX.trim_end() => "",
        None => value.trim_end(),
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<String, TokenError> {
    let value = headers
        .get(AUTHORIZATION_HEADER)
        .ok_or(TokenError::Empty)?
        .to_str()
        .map_err(|_| TokenError::Invalid)?;
    let token = strip_bearer(value);
    if token.is_empty() {
        return Err(TokenError::Empty);
    }
    Ok(token.to_string())
}

async fn authenticate(
    validator: &dyn TokenValidator,
    headers: &HeaderMap,
) -> Result<Principal, TokenError> {
    let token = bearer_token(headers)?;
    validator.validate(&token).await
}

const fn rejection_message(error: &TokenError) -> &'static str {
    match error {
        TokenError::Empty => "Authorization token required",
        TokenError::Invalid => "Invalid token",
        TokenError::Expired => "Token expired",
        TokenError::Unavailable(_) => "Token validation unavailable",
    }
}

// =============================================================================
// Layer & Service
// =============================================================================

/// Layer installing [`AuthMiddleware`].
#[derive(Clone)]
pub struct AuthLayer {
    validator: Arc<dyn TokenValidator>,
    policy: MethodPolicy,
}

impl AuthLayer {
    /// Create a layer with the default [`MethodPolicy`].
    #[must_use]
    pub fn new(validator: Arc<dyn TokenValidator>) -> Self {
        Self::with_policy(validator, MethodPolicy::default())
    }

    /// Create a layer with a custom allowlist.
    #[must_use]
    pub fn with_policy(validator: Arc<dyn TokenValidator>, policy: MethodPolicy) -> Self {
        Self { validator, policy }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            validator: Arc::clone(&self.validator),
            policy: self.policy.clone(),
        }
    }
}

/// Service validating bearer tokens before forwarding to `inner`.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    validator: Arc<dyn TokenValidator>,
    policy: MethodPolicy,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for AuthMiddleware<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Default + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        // The clone may not be ready; keep the one poll_ready was called on.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let validator = Arc::clone(&self.validator);
        let policy = self.policy.clone();

        Box::pin(async move {
            let path = request.uri().path().to_owned();
            if policy.is_public(&path) {
                return inner.call(request).await;
            }

            match authenticate(validator.as_ref(), request.headers()).await {
                Ok(principal) => {
                    tracing::debug!(method = %path, user_id = %principal, "Authenticated call");
                    request.extensions_mut().insert(principal);
                    inner.call(request).await
                }
                Err(error) => {
                    tracing::warn!(method = %path, reason = %error, "Rejected unauthenticated call");
                    Ok(Status::unauthenticated(rejection_message(&error)).into_http())
                }
            }
        })
    }
}

// =============================================================================
// Validators
// =============================================================================

/// Validates tokens with the container's [`TokenService`].
#[derive(Clone)]
pub struct AuthServiceTokenValidator {
    tokens: Arc<dyn TokenService>,
}

impl AuthServiceTokenValidator {
    /// Wrap a token service.
    #[must_use]
    pub fn new(tokens: Arc<dyn TokenService>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl TokenValidator for AuthServiceTokenValidator {
    async fn validate(&self, token: &str) -> Result<Principal, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Empty);
        }
        let claims = self.tokens.validate_token(token).await?;
        Principal::new(claims.user_id).ok_or(TokenError::Invalid)
    }
}
