//! AuthService client.

use async_trait::async_trait;
use tonic::transport::Channel;

use super::config::ClientConfig;
use super::connection::{ClosableClient, LazyStub, outbound};
use super::error::ClientError;
use crate::infrastructure::grpc::proto::hub::v1::{
    LoginRequest, LoginResponse, ValidateTokenRequest, ValidateTokenResponse,
    auth_service_client::AuthServiceClient,
};

/// Client for `hub.v1.AuthService`.
pub struct AuthClient {
    stub: LazyStub<AuthServiceClient<Channel>>,
}

impl AuthClient {
    /// Create a client; nothing is dialled until first use.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            stub: LazyStub::new(config, AuthServiceClient::new),
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

    /// Exchange credentials for a token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let mut client = self.stub.get().await?;
        let request = outbound(
            LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            },
            self.config().timeout,
            None,
        )?;
        client
            .login(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| ClientError::rpc("Login", status))
    }

    /// Check a token.
    pub async fn validate_token(&self, token: &str) -> Result<ValidateTokenResponse, ClientError> {
        let mut client = self.stub.get().await?;
        let request = outbound(
            ValidateTokenRequest {
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
}

#[async_trait]
impl ClosableClient for AuthClient {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn close(&self) -> Result<(), ClientError> {
        self.stub.close().await;
        Ok(())
    }
}
