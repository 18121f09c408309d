//! Dependency Container
//!
//! Handlers resolve use cases through the [`Container`] trait, one accessor
//! per port. [`ServiceContainer`] is the builder-assembled implementation.

use std::sync::Arc;

use thiserror::Error;

use crate::application::ports::{
    CancelOrderUseCase, GetOrderStatusUseCase, LoginUseCase, MarketDataUseCase,
    PositionAggregationUseCase, SubmitOrderUseCase, TokenService,
};

/// Access to every use case the gRPC handlers need.
///
/// Substituting another implementation requires no handler changes.
pub trait Container: Send + Sync {
    /// Credentials check.
    fn login_use_case(&self) -> Arc<dyn LoginUseCase>;

    /// Token minting and validation.
    fn auth_service(&self) -> Arc<dyn TokenService>;

    /// Order submission.
    fn submit_order_use_case(&self) -> Arc<dyn SubmitOrderUseCase>;

    /// Order lookup.
    fn get_order_status_use_case(&self) -> Arc<dyn GetOrderStatusUseCase>;

    /// Order cancellation.
    fn cancel_order_use_case(&self) -> Arc<dyn CancelOrderUseCase>;

    /// Position aggregation.
    fn position_aggregation_use_case(&self) -> Arc<dyn PositionAggregationUseCase>;

    /// Market quotes.
    fn market_data_use_case(&self) -> Arc<dyn MarketDataUseCase>;
}

/// Error assembling a [`ServiceContainer`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    /// A port was never supplied to the builder.
    #[error("missing port: {0}")]
    MissingPort(&'static str),
}

/// Container holding one `Arc` per port.
#[derive(Clone)]
pub struct ServiceContainer {
    login: Arc<dyn LoginUseCase>,
    tokens: Arc<dyn TokenService>,
    submit_order: Arc<dyn SubmitOrderUseCase>,
    order_status: Arc<dyn GetOrderStatusUseCase>,
    cancel_order: Arc<dyn CancelOrderUseCase>,
    positions: Arc<dyn PositionAggregationUseCase>,
    market_data: Arc<dyn MarketDataUseCase>,
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContainer").finish_non_exhaustive()
    }
}

impl ServiceContainer {
    /// Start building a container.
    #[must_use]
    pub fn builder() -> ServiceContainerBuilder {
        ServiceContainerBuilder::default()
    }
}

impl Container for ServiceContainer {
    fn login_use_case(&self) -> Arc<dyn LoginUseCase> {
        Arc::clone(&self.login)
    }

    fn auth_service(&self) -> Arc<dyn TokenService> {
        Arc::clone(&self.tokens)
    }

    fn submit_order_use_case(&self) -> Arc<dyn SubmitOrderUseCase> {
        Arc::clone(&self.submit_order)
    }

    fn get_order_status_use_case(&self) -> Arc<dyn GetOrderStatusUseCase> {
        Arc::clone(&self.order_status)
    }

    fn cancel_order_use_case(&self) -> Arc<dyn CancelOrderUseCase> {
        Arc::clone(&self.cancel_order)
    }

    fn position_aggregation_use_case(&self) -> Arc<dyn PositionAggregationUseCase> {
        Arc::clone(&self.positions)
    }

    fn market_data_use_case(&self) -> Arc<dyn MarketDataUseCase> {
        Arc::clone(&self.market_data)
    }
}

/// Builder for [`ServiceContainer`].
#[derive(Default)]
pub struct ServiceContainerBuilder {
    login: Option<Arc<dyn LoginUseCase>>,
    tokens: Option<Arc<dyn TokenService>>,
    submit_order: Option<Arc<dyn SubmitOrderUseCase>>,
    order_status: Option<Arc<dyn GetOrderStatusUseCase>>,
    cancel_order: Option<Arc<dyn CancelOrderUseCase>>,
    positions: Option<Arc<dyn PositionAggregationUseCase>>,
    market_data: Option<Arc<dyn MarketDataUseCase>>,
}

impl ServiceContainerBuilder {
    /// Set the login use case.
    #[must_use]
    pub fn login(mut self, port: Arc<dyn LoginUseCase>) -> Self {
        self.login = Some(port);
        self
    }

    /// Set the token service.
    #[must_use]
    pub fn auth_service(mut self, port: Arc<dyn TokenService>) -> Self {
        self.tokens = Some(port);
        self
    }

    /// Set the order submission use case.
    #[must_use]
    pub fn submit_order(mut self, port: Arc<dyn SubmitOrderUseCase>) -> Self {
        self.submit_order = Some(port);
        self
    }

    /// Set the order lookup use case.
    #[must_use]
    pub fn order_status(mut self, port: Arc<dyn GetOrderStatusUseCase>) -> Self {
        self.order_status = Some(port);
        self
    }

    /// Set the order cancellation use case.
    #[must_use]
    pub fn cancel_order(mut self, port: Arc<dyn CancelOrderUseCase>) -> Self {
        self.cancel_order = Some(port);
        self
    }

    /// Set the position aggregation use case.
    #[must_use]
    pub fn position_aggregation(mut self, port: Arc<dyn PositionAggregationUseCase>) -> Self {
        self.positions = Some(port);
        self
    }

    /// Set the market data use case.
    #[must_use]
    pub fn market_data(mut self, port: Arc<dyn MarketDataUseCase>) -> Self {
        self.market_data = Some(port);
        self
    }

    /// Use one backend for every port.
    #[must_use]
    pub fn with_backend<B>(self, backend: &Arc<B>) -> Self
    where
        B: LoginUseCase
            + TokenService
            + SubmitOrderUseCase
            + GetOrderStatusUseCase
            + CancelOrderUseCase
            + PositionAggregationUseCase
            + MarketDataUseCase
            + 'static,
    {
        self.login(backend.clone())
            .auth_service(backend.clone())
            .submit_order(backend.clone())
            .order_status(backend.clone())
            .cancel_order(backend.clone())
            .position_aggregation(backend.clone())
            .market_data(backend.clone())
    }

    /// Finish building.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::MissingPort`] naming the first port that was
    /// not supplied.
    pub fn build(self) -> Result<ServiceContainer, ContainerError> {
        Ok(ServiceContainer {
            login: self.login.ok_or(ContainerError::MissingPort("login"))?,
            tokens: self.tokens.ok_or(ContainerError::MissingPort("auth_service"))?,
            submit_order: self
                .submit_order
                .ok_or(ContainerError::MissingPort("submit_order"))?,
            order_status: self
                .order_status
                .ok_or(ContainerError::MissingPort("order_status"))?,
            cancel_order: self
                .cancel_order
                .ok_or(ContainerError::MissingPort("cancel_order"))?,
            positions: self
                .positions
                .ok_or(ContainerError::MissingPort("position_aggregation"))?,
            market_data: self
                .market_data
                .ok_or(ContainerError::MissingPort("market_data"))?,
        })
    }
}
