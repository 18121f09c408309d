//! OrderService client.

use async_trait::async_trait;
use tonic::transport::Channel;

use super::config::ClientConfig;
use super::connection::{ClosableClient, LazyStub, outbound};
use super::error::ClientError;
use crate::infrastructure::grpc::proto::hub::v1::{
    CancelOrderRequest, CancelOrderResponse, GetOrderDetailsRequest, GetOrderDetailsResponse,
    GetOrderStatusRequest, GetOrderStatusResponse, SubmitOrderRequest, SubmitOrderResponse,
    order_service_client::OrderServiceClient,
};

/// Client for `hub.v1.OrderService`.
///
/// Every call takes an optional bearer token.
pub struct OrderClient {
    stub: LazyStub<OrderServiceClient<Channel>>,
}

impl OrderClient {
    /// Create a client; nothing is dialled until first use.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            stub: LazyStub::new(config, OrderServiceClient::new),
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

    /// Submit an order.
    pub async fn submit_order(
        &self,
        request: SubmitOrderRequest,
        token: Option<&str>,
    ) -> Result<SubmitOrderResponse, ClientError> {
        let mut client = self.stub.get().await?;
        let request = outbound(request, self.config().timeout, token)?;
        client
            .submit_order(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| ClientError::rpc("SubmitOrder", status))
    }

    /// Fetch an order with all its details.
    pub async fn get_order_details(
        &self,
        order_id: &str,
        user_id: &str,
        token: Option<&str>,
    ) -> Result<GetOrderDetailsResponse, ClientError> {
        let mut client = self.stub.get().await?;
        let request = outbound(
            GetOrderDetailsRequest {
                order_id: order_id.to_string(),
                user_id: user_id.to_string(),
            },
            self.config().timeout,
            token,
        )?;
        client
            .get_order_details(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| ClientError::rpc("GetOrderDetails", status))
    }

    /// Fetch an order's current status.
    pub async fn get_order_status(
        &self,
        order_id: &str,
        user_id: &str,
        token: Option<&str>,
    ) -> Result<GetOrderStatusResponse, ClientError> {
        let mut client = self.stub.get().await?;
        let request = outbound(
            GetOrderStatusRequest {
                order_id: order_id.to_string(),
                user_id: user_id.to_string(),
            },
            self.config().timeout,
            token,
        )?;
        client
            .get_order_status(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| ClientError::rpc("GetOrderStatus", status))
    }

    /// Cancel an order.
    pub async fn cancel_order(
        &self,
        order_id: &str,
        user_id: &str,
        token: Option<&str>,
    ) -> Result<CancelOrderResponse, ClientError> {
        let mut client = self.stub.get().await?;
        let request = outbound(
            CancelOrderRequest {
                order_id: order_id.to_string(),
                user_id: user_id.to_string(),
            },
            self.config().timeout,
            token,
        )?;
        client
            .cancel_order(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| ClientError::rpc("CancelOrder", status))
    }
}

#[async_trait]
impl ClosableClient for OrderClient {
    fn name(&self) -> &'static str {
        "order"
    }

    async fn close(&self) -> Result<(), ClientError> {
        self.stub.close().await;
        Ok(())
    }
}
