//! PositionService client.

use async_trait::async_trait;
use tonic::transport::Channel;

use super::config::ClientConfig;
use super::connection::{ClosableClient, LazyStub, outbound};
use super::error::ClientError;
use crate::infrastructure::grpc::proto::hub::v1::{
    CreatePositionRequest, CreatePositionResponse, GetPositionAggregationRequest,
    GetPositionAggregationResponse, GetPositionsRequest, GetPositionsResponse,
    UpdatePositionRequest, UpdatePositionResponse, position_service_client::PositionServiceClient,
};

/// Client for `hub.v1.PositionService`.
pub struct PositionClient {
    stub: LazyStub<PositionServiceClient<Channel>>,
}

impl PositionClient {
    /// Create a client; nothing is dialled until first use.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            stub: LazyStub::new(config, PositionServiceClient::new),
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

    /// List a user's positions.
    pub async fn get_positions(
        &self,
        user_id: &str,
        token: Option<&str>,
    ) -> Result<GetPositionsResponse, ClientError> {
        let mut client = self.stub.get().await?;
        let request = outbound(
            GetPositionsRequest {
                user_id: user_id.to_string(),
            },
            self.config().timeout,
            token,
        )?;
        client
            .get_positions(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| ClientError::rpc("GetPositions", status))
    }

    /// Aggregate a user's positions by category.
    pub async fn get_position_aggregation(
        &self,
        user_id: &str,
        token: Option<&str>,
    ) -> Result<GetPositionAggregationResponse, ClientError> {
        let mut client = self.stub.get().await?;
        let request = outbound(
            GetPositionAggregationRequest {
                user_id: user_id.to_string(),
            },
            self.config().timeout,
            token,
        )?;
        client
            .get_position_aggregation(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| ClientError::rpc("GetPositionAggregation", status))
    }

    /// Open a position.
    pub async fn create_position(
        &self,
        request: CreatePositionRequest,
        token: Option<&str>,
    ) -> Result<CreatePositionResponse, ClientError> {
        let mut client = self.stub.get().await?;
        let request = outbound(request, self.config().timeout, token)?;
        client
            .create_position(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| ClientError::rpc("CreatePosition", status))
    }

    /// Modify a position.
    pub async fn update_position(
        &self,
        request: UpdatePositionRequest,
        token: Option<&str>,
    ) -> Result<UpdatePositionResponse, ClientError> {
        let mut client = self.stub.get().await?;
        let request = outbound(request, self.config().timeout, token)?;
        client
            .update_position(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| ClientError::rpc("UpdatePosition", status))
    }
}

#[async_trait]
impl ClosableClient for PositionClient {
    fn name(&self) -> &'static str {
        "position"
    }

    async fn close(&self) -> Result<(), ClientError> {
        self.stub.close().await;
        Ok(())
    }
}
