//! gRPC Transport Endpoint
//!
//! Binds the listener, wires the handlers from a [`Container`] and serves them
//! behind the [`AuthLayer`] until [`GrpcServer::stop`] is called.
//!
//! ```ignore
//! let (server, listener) = GrpcServer::create(container, 50051).await?;
//! let handle = server.clone();
//! tokio::spawn(async move { handle.serve(listener).await });
//! // ...
//! server.stop();
//! ```

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;

use super::auth::{AuthLayer, AuthServiceTokenValidator};
use super::auth_service::AuthServiceImpl;
use super::market_data_service::MarketDataServiceImpl;
use super::order_service::OrderServiceImpl;
use super::position_service::PositionServiceImpl;
use super::proto::hub::v1::{
    auth_service_server::AuthServiceServer, market_data_service_server::MarketDataServiceServer,
    order_service_server::OrderServiceServer, position_service_server::PositionServiceServer,
};
use crate::application::container::Container;
use crate::application::ports::TokenValidator;

/// Error starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("failed to bind gRPC listener on {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The transport failed while serving.
    #[error("gRPC transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

/// The gRPC endpoint.
///
/// Cheap to clone; clones share the same stop signal.
#[derive(Clone)]
pub struct GrpcServer {
    auth_layer: AuthLayer,
    auth: AuthServiceImpl,
    orders: OrderServiceImpl,
    positions: PositionServiceImpl,
    market_data: MarketDataServiceImpl,
    shutdown: CancellationToken,
}

impl GrpcServer {
    /// Bind `0.0.0.0:<port>` and wire every service from `container`.
    ///
    /// Tokens are validated with the container's auth service. Port 0 binds an
    /// ephemeral port; read it back from the returned listener.
    pub async fn create(
        container: &dyn Container,
        port: u16,
    ) -> Result<(Self, TcpListener), ServerError> {
        let validator: Arc<dyn TokenValidator> =
            Arc::new(AuthServiceTokenValidator::new(container.auth_service()));
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        Self::create_with_validator(container, validator, addr).await
    }

    /// Bind `addr` and wire every service, validating tokens with `validator`.
    pub async fn create_with_validator(
        container: &dyn Container,
        validator: Arc<dyn TokenValidator>,
        addr: SocketAddr,
    ) -> Result<(Self, TcpListener), ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        let server = Self {
            auth_layer: AuthLayer::new(validator),
            auth: AuthServiceImpl::from_container(container),
            orders: OrderServiceImpl::from_container(container),
            positions: PositionServiceImpl::from_container(container),
            market_data: MarketDataServiceImpl::from_container(container),
            shutdown: CancellationToken::new(),
        };

        tracing::info!(
            addr = %listener.local_addr().unwrap_or(addr),
            "gRPC listener bound"
        );
        Ok((server, listener))
    }

    /// Serve on `listener` until [`stop`](Self::stop) is called.
    ///
    /// In-flight calls are drained before the listener is dropped.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        let addr = listener.local_addr().ok();
        tracing::info!(addr = ?addr, "gRPC server listening");

        Server::builder()
            .layer(self.auth_layer.clone())
            .add_service(AuthServiceServer::new(self.auth.clone()))
            .add_service(OrderServiceServer::new(self.orders.clone()))
            .add_service(PositionServiceServer::new(self.positions.clone()))
            .add_service(MarketDataServiceServer::new(self.market_data.clone()))
            .serve_with_incoming_shutdown(
                TcpListenerStream::new(listener),
                self.shutdown.clone().cancelled_owned(),
            )
            .await?;

        tracing::info!("gRPC server stopped");
        Ok(())
    }

    /// Signal graceful shutdown. Idempotent.
    pub fn stop(&self) {
        if !self.shutdown.is_cancelled() {
            tracing::info!("gRPC server stopping");
        }
        self.shutdown.cancel();
    }

    /// Whether [`stop`](Self::stop) has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}
