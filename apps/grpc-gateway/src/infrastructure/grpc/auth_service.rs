//! AuthService Handler
//!
//! `Login` and `ValidateToken` are allowlisted by the auth middleware, so no
//! principal is expected here. Every failure is reported in-envelope.

use std::sync::Arc;

use tonic::{Code, Request, Response, Status};

use super::envelope::{CallOutcome, EnvelopeError, respond};
use super::proto::hub::v1::{
    LoginRequest, LoginResponse, UserInfo, ValidateTokenRequest, ValidateTokenResponse,
    auth_service_server::AuthService,
};
use crate::application::container::Container;
use crate::application::errors::UseCaseError;
use crate::application::ports::{LoginUseCase, TokenService};
use crate::domain::identity::User;

/// `AuthService` implementation.
#[derive(Clone)]
pub struct AuthServiceImpl {
    login: Arc<dyn LoginUseCase>,
    tokens: Arc<dyn TokenService>,
}

impl AuthServiceImpl {
    /// Create a handler from its ports.
    #[must_use]
    pub fn new(login: Arc<dyn LoginUseCase>, tokens: Arc<dyn TokenService>) -> Self {
        Self { login, tokens }
    }

    /// Resolve the ports from a container.
    #[must_use]
    pub fn from_container(container: &dyn Container) -> Self {
        Self::new(container.login_use_case(), container.auth_service())
    }

    async fn resolve_login(&self, request: LoginRequest) -> CallOutcome<LoginResponse> {
        let email = request.email.trim();
        if email.is_empty() || request.password.is_empty() {
            return EnvelopeError::invalid_argument("Email and password are required").into();
        }

        let user = match self.login.execute(email, &request.password).await {
            Ok(user) => user,
            Err(UseCaseError::InvalidCredentials) => {
                tracing::warn!("Login rejected: invalid credentials");
                return EnvelopeError::new(Code::Unauthenticated, "Invalid email or password")
                    .into();
            }
            Err(error) => {
                tracing::warn!(error = %error, "Login failed");
                return EnvelopeError::from_use_case("Login failed", &error).into();
            }
        };

        let token = match self.tokens.create_token(&user.email, &user.id).await {
            Ok(token) => token,
            Err(error) => {
                tracing::error!(user_id = %user.id, error = %error, "Token creation failed");
                return EnvelopeError::new(
                    Code::Internal,
                    format!("Failed to generate token: {error}"),
                )
                .into();
            }
        };

        tracing::info!(user_id = %user.id, "User logged in");
        CallOutcome::success(
            "Login successful",
            LoginResponse {
                api_response: None,
                token,
                user_info: Some(user_info(&user)),
            },
        )
    }

    async fn resolve_validate_token(
        &self,
        request: ValidateTokenRequest,
    ) -> CallOutcome<ValidateTokenResponse> {
        let token = request.token.trim();
        if token.is_empty() {
            return EnvelopeError::invalid_argument("Token is required").into();
        }

        match self.tokens.validate_token(token).await {
            Ok(claims) => CallOutcome::success(
                "Token is valid",
                ValidateTokenResponse {
                    api_response: None,
                    is_valid: true,
                    user_info: Some(UserInfo {
                        user_id: claims.user_id.clone(),
                        ..Default::default()
                    }),
                    expires_at: claims.expires_at_unix(),
                },
            ),
            Err(error) => {
                tracing::debug!(error = %error, "Token validation failed");
                EnvelopeError::new(Code::Unauthenticated, format!("Invalid token: {error}")).into()
            }
        }
    }
}

fn user_info(user: &User) -> UserInfo {
    UserInfo {
        user_id: user.id.clone(),
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
    }
}

#[tonic::async_trait]
impl AuthService for AuthServiceImpl {
    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> Result<Response<LoginResponse>, Status> {
        tracing::debug!("Login called");
        respond(self.resolve_login(request.into_inner()).await)
    }

    async fn validate_token(
        &self,
        request: Request<ValidateTokenRequest>,
    ) -> Result<Response<ValidateTokenResponse>, Status> {
        tracing::debug!("ValidateToken called");
        respond(self.resolve_validate_token(request.into_inner()).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::TokenError;
    use crate::application::ports::TokenClaims;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockLogin {
        calls: AtomicUsize,
    }

    impl MockLogin {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LoginUseCase for MockLogin {
        async fn execute(&self, email: &str, password: &str) -> Result<User, UseCaseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match (email, password) {
                ("alice@example.com", "pw") => Ok(User::new("u-1", "alice@example.com")),
                ("broken@example.com", _) => Err(UseCaseError::Internal("db down".to_string())),
                _ => Err(UseCaseError::InvalidCredentials),
            }
        }
    }

    /// Issues "TKN" and accepts only "TKN".
    struct MockTokens {
        fail_create: bool,
    }

    #[async_trait]
    impl TokenService for MockTokens {
        async fn create_token(&self, _email: &str, _user_id: &str) -> Result<String, UseCaseError> {
            if self.fail_create {
                Err(UseCaseError::Internal("signing key missing".to_string()))
            } else {
                Ok("TKN".to_string())
            }
        }

        async fn validate_token(&self, token: &str) -> Result<TokenClaims, TokenError> {
            if token == "TKN" {
                Ok(TokenClaims {
                    user_id: "u-1".to_string(),
                    email: Some("alice@example.com".to_string()),
                    expires_at: chrono::DateTime::from_timestamp(1_900_000_000, 0),
                })
            } else {
                Err(TokenError::Invalid)
            }
        }
    }

    fn handler(login: Arc<MockLogin>, fail_create: bool) -> AuthServiceImpl {
        AuthServiceImpl::new(login, Arc::new(MockTokens { fail_create }))
    }

    async fn login(service: &AuthServiceImpl, email: &str, password: &str) -> LoginResponse {
        service
            .login(Request::new(LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            }))
            .await
            .unwrap()
            .into_inner()
    }

    #[tokio::test]
    async fn login_returns_token_and_user_info() {
        let service = handler(MockLogin::new(), false);
        let response = login(&service, "alice@example.com", "pw").await;

        let envelope = response.api_response.unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.code, 0);
        assert_eq!(response.token, "TKN");
        let user = response.user_info.unwrap();
        assert_eq!(user.user_id, "u-1");
        assert_eq!(user.email, "alice@example.com");
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let login_port = MockLogin::new();
        let service = handler(login_port.clone(), false);

        for (email, password) in [("", "pw"), ("alice@example.com", ""), ("  ", "pw")] {
            let envelope = login(&service, email, password).await.api_response.unwrap();
            assert!(!envelope.success);
            assert_eq!(envelope.code, Code::InvalidArgument as i32);
            assert_eq!(envelope.message, "Email and password are required");
        }
        assert_eq!(login_port.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_credentials_are_unauthenticated_in_envelope() {
        let service = handler(MockLogin::new(), false);
        let response = login(&service, "alice@example.com", "wrong").await;

        let envelope = response.api_response.unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.code, Code::Unauthenticated as i32);
        assert!(response.token.is_empty());
    }

    #[tokio::test]
    async fn login_use_case_failure_maps_by_category() {
        let service = handler(MockLogin::new(), false);
        let envelope = login(&service, "broken@example.com", "pw")
            .await
            .api_response
            .unwrap();
        assert_eq!(envelope.code, Code::Internal as i32);
        assert!(envelope.message.contains("db down"));
    }

    #[tokio::test]
    async fn token_creation_failure_is_internal() {
        let service = handler(MockLogin::new(), true);
        let envelope = login(&service, "alice@example.com", "pw")
            .await
            .api_response
            .unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.code, Code::Internal as i32);
        assert!(envelope.message.starts_with("Failed to generate token"));
    }

    #[tokio::test]
    async fn login_then_validate_token_is_valid() {
        let service = handler(MockLogin::new(), false);
        let token = login(&service, "alice@example.com", "pw").await.token;

        let response = service
            .validate_token(Request::new(ValidateTokenRequest { token }))
            .await
            .unwrap()
            .into_inner();

        assert!(response.is_valid);
        assert!(response.api_response.unwrap().success);
        let user = response.user_info.unwrap();
        assert_eq!(user.user_id, "u-1");
        assert!(user.email.is_empty());
        assert_eq!(response.expires_at, 1_900_000_000);
    }

    #[tokio::test]
    async fn empty_token_is_invalid_argument() {
        let service = handler(MockLogin::new(), false);
        let response = service
            .validate_token(Request::new(ValidateTokenRequest {
                token: String::new(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(!response.is_valid);
        let envelope = response.api_response.unwrap();
        assert_eq!(envelope.code, Code::InvalidArgument as i32);
        assert!(!envelope.message.is_empty());
    }

    #[tokio::test]
    async fn rejected_token_is_unauthenticated() {
        let service = handler(MockLogin::new(), false);
        let response = service
            .validate_token(Request::new(ValidateTokenRequest {
                token: "forged".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(!response.is_valid);
        assert_eq!(
            response.api_response.unwrap().code,
            Code::Unauthenticated as i32
        );
    }
}
