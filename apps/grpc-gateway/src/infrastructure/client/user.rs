//! User service client.
//!
//! Besides the two RPCs it implements [`TokenValidator`], so the server can
//! delegate bearer-token validation to the User service.

use async_trait::async_trait;
use tonic::Code;
use tonic::transport::Channel;

use super::config::ClientConfig;
use super::connection::{ClosableClient, LazyStub, outbound};
use super::error::ClientError;
use crate::application::errors::TokenError;
use crate::application::ports::TokenValidator;
use crate::domain::identity::Principal;
use crate::infrastructure::grpc::proto::hub::v1::{
    GetUserProfileRequest, GetUserProfileResponse, UserValidateTokenRequest,
    UserValidateTokenResponse, user_service_client::UserServiceClient as UserServiceStub,
};

/// Client for `hub.v1.UserService`.
pub struct UserServiceClient {
    stub: LazyStub<UserServiceStub<Channel>>,
}

impl Default for UserServiceClient {
    fn default() -> Self {
        Self::new(ClientConfig::user_service())
    }
}

impl UserServiceClient {
    /// Create a client; nothing is dialled until first use.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            stub: LazyStub::new(config, UserServiceStub::new),
        }
    }

    /// Client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        self.stub.config()
    }

    /// Dial now. No-op when already connected.
    pub async fn connect(&self) -> Result<(), ClientError> {
        self.stub.connect().await
    }

    /// Whether a connection is currently held.
    pub async fn is_connected(&self) -> bool {
        self.stub.is_connected().await
    }

    /// Ask the User service whether `token` is valid.
    pub async fn validate_token(
        &self,
        token: &str,
    ) -> Result<UserValidateTokenResponse, ClientError> {
        let mut client = self.stub.get().await?;
        let request = outbound(
            UserValidateTokenRequest {
                token: token.to_string(),
            },
            self.config().timeout,
            None,
        )?;
        client
            .validate_token(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| ClientError::rpc("ValidateToken", status))
    }

    /// Fetch a user's profile.
    pub async fn get_user_profile(
        &self,
        user_id: &str,
    ) -> Result<GetUserProfileResponse, ClientError> {
        let mut client = self.stub.get().await?;
        let request = outbound(
            GetUserProfileRequest {
                user_id: user_id.to_string(),
            },
            self.config().timeout,
            None,
        )?;
        client
            .get_user_profile(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| ClientError::rpc("GetUserProfile", status))
    }
}

#[async_trait]
impl TokenValidator for UserServiceClient {
    async fn validate(&self, token: &str) -> Result<Principal, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Empty);
        }
        let response = self.validate_token(token).await.map_err(token_error)?;
        if !response.is_valid {
            return Err(TokenError::Invalid);
        }
        response
            .user_info
            .and_then(|info| Principal::new(info.user_id))
            .ok_or(TokenError::Invalid)
    }
}

/// A definite rejection from the User service is `Invalid`; anything else
/// means it could not answer.
fn token_error(error: ClientError) -> TokenError {
    match error.code() {
        Some(Code::Unauthenticated | Code::InvalidArgument | Code::PermissionDenied) => {
            tracing::debug!(error = %error, "User service rejected token");
            TokenError::Invalid
        }
        _ => {
            tracing::warn!(error = %error, "User service token validation unavailable");
            TokenError::Unavailable(error.to_string())
        }
    }
}

#[async_trait]
impl ClosableClient for UserServiceClient {
    fn name(&self) -> &'static str {
        "user"
    }

    async fn close(&self) -> Result<(), ClientError> {
        self.stub.close().await;
        Ok(())
    }
}
