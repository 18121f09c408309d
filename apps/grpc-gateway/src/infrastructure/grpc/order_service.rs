//! OrderService Handler
//!
//! Every method requires a principal, and the body `user_id` must match it.
//! Validation and use-case failures are reported in-envelope.

use std::sync::Arc;

use chrono::Utc;
use tonic::{Request, Response, Status};

use super::envelope::{CallOutcome, EnvelopeError, respond};
use super::guard::authorize;
use super::proto::hub::v1::{
    CancelOrderRequest, CancelOrderResponse, GetOrderDetailsRequest, GetOrderDetailsResponse,
    GetOrderStatusRequest, GetOrderStatusResponse, OrderDetails, SubmitOrderRequest,
    SubmitOrderResponse, order_service_server::OrderService,
};
use crate::application::container::Container;
use crate::application::ports::{
    CancelOrderCommand, CancelOrderUseCase, GetOrderStatusUseCase, OrderView, SubmitOrderCommand,
    SubmitOrderUseCase,
};
use crate::domain::order::{OrderSide, OrderStatus, OrderType};

/// Reason recorded on cancellations requested through this service.
pub const CANCEL_REASON: &str = "User cancellation request via gRPC";

/// `OrderService` implementation.
#[derive(Clone)]
pub struct OrderServiceImpl {
    submit_order: Arc<dyn SubmitOrderUseCase>,
    order_status: Arc<dyn GetOrderStatusUseCase>,
    cancel_order: Arc<dyn CancelOrderUseCase>,
}

impl OrderServiceImpl {
    /// Create a handler from its ports.
    #[must_use]
    pub fn new(
        submit_order: Arc<dyn SubmitOrderUseCase>,
        order_status: Arc<dyn GetOrderStatusUseCase>,
        cancel_order: Arc<dyn CancelOrderUseCase>,
    ) -> Self {
        Self {
            submit_order,
            order_status,
            cancel_order,
        }
    }

    /// Resolve the ports from a container.
    #[must_use]
    pub fn from_container(container: &dyn Container) -> Self {
        Self::new(
            container.submit_order_use_case(),
            container.get_order_status_use_case(),
            container.cancel_order_use_case(),
        )
    }

    async fn resolve_submit(
        &self,
        request: Request<SubmitOrderRequest>,
    ) -> CallOutcome<SubmitOrderResponse> {
        let principal = match authorize(&request, &request.get_ref().user_id) {
            Ok(principal) => principal,
            Err(status) => return status.into(),
        };
        let command = match submit_command(principal.user_id(), request.into_inner()) {
            Ok(command) => command,
            Err(error) => return error.into(),
        };

        tracing::debug!(
            user_id = %command.user_id,
            symbol = %command.symbol,
            order_type = %command.order_type,
            order_side = %command.order_side,
            quantity = command.quantity,
            "Submitting order"
        );

        match self.submit_order.execute(command).await {
            Ok(result) => {
                tracing::info!(order_id = %result.order_id, status = %result.status, "Order submitted");
                CallOutcome::success(
                    "Order submitted successfully",
                    SubmitOrderResponse {
                        api_response: None,
                        order_id: result.order_id,
                        status: result.status.to_string(),
                        submitted_at: Utc::now().to_rfc3339(),
                        estimated_price: result.estimated_price,
                        market_price: result.market_price,
                    },
                )
            }
            Err(error) => {
                tracing::warn!(error = %error, "Order submission failed");
                EnvelopeError::from_use_case("Failed to submit order", &error).into()
            }
        }
    }

    async fn resolve_status(
        &self,
        request: Request<GetOrderStatusRequest>,
    ) -> CallOutcome<GetOrderStatusResponse> {
        let principal = match authorize(&request, &request.get_ref().user_id) {
            Ok(principal) => principal,
            Err(status) => return status.into(),
        };
        let order_id = request.get_ref().order_id.trim();
        if order_id.is_empty() {
            return EnvelopeError::invalid_argument("Order ID is required").into();
        }

        match self.order_status.execute(order_id, principal.user_id()).await {
            Ok(view) => CallOutcome::success(
                "Order status retrieved successfully",
                GetOrderStatusResponse {
                    api_response: None,
                    order_id: view.order_id,
                    status: view.status.to_string(),
                    status_message: status_message(view.status),
                    updated_at: view.updated_at.to_rfc3339(),
                },
            ),
            Err(error) => {
                tracing::warn!(order_id, error = %error, "Order status lookup failed");
                EnvelopeError::from_use_case("Failed to get order status", &error).into()
            }
        }
    }

    async fn resolve_details(
        &self,
        request: Request<GetOrderDetailsRequest>,
    ) -> CallOutcome<GetOrderDetailsResponse> {
        let principal = match authorize(&request, &request.get_ref().user_id) {
            Ok(principal) => principal,
            Err(status) => return status.into(),
        };
        let order_id = request.get_ref().order_id.trim();
        if order_id.is_empty() {
            return EnvelopeError::invalid_argument("Order ID is required").into();
        }

        match self.order_status.execute(order_id, principal.user_id()).await {
            Ok(view) => CallOutcome::success(
                "Order details retrieved successfully",
                GetOrderDetailsResponse {
                    api_response: None,
                    order: Some(order_details(view)),
                },
            ),
            Err(error) => {
                tracing::warn!(order_id, error = %error, "Order details lookup failed");
                EnvelopeError::from_use_case("Failed to get order details", &error).into()
            }
        }
    }

    async fn resolve_cancel(
        &self,
        request: Request<CancelOrderRequest>,
    ) -> CallOutcome<CancelOrderResponse> {
        let principal = match authorize(&request, &request.get_ref().user_id) {
            Ok(principal) => principal,
            Err(status) => return status.into(),
        };
        let order_id = request.get_ref().order_id.trim();
        if order_id.is_empty() {
            return EnvelopeError::invalid_argument("Order ID is required").into();
        }

        let command = CancelOrderCommand {
            order_id: order_id.to_string(),
            user_id: principal.user_id().to_string(),
            reason: CANCEL_REASON.to_string(),
        };

        match self.cancel_order.execute(command).await {
            Ok(result) => {
                tracing::info!(order_id = %result.order_id, "Order cancelled");
                CallOutcome::success(
                    "Order cancelled successfully",
                    CancelOrderResponse {
                        api_response: None,
                        order_id: result.order_id,
                        status: OrderStatus::Cancelled.to_string(),
                        cancelled_at: result.cancelled_at.to_rfc3339(),
                    },
                )
            }
            Err(error) => {
                tracing::warn!(order_id, error = %error, "Order cancellation failed");
                EnvelopeError::from_use_case("Failed to cancel order", &error).into()
            }
        }
    }
}

/// Validate a submit request and translate it into a command.
fn submit_command(
    user_id: &str,
    request: SubmitOrderRequest,
) -> Result<SubmitOrderCommand, EnvelopeError> {
    let symbol = request.symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(EnvelopeError::invalid_argument("Symbol is required"));
    }
    if !request.quantity.is_finite() || request.quantity <= 0.0 {
        return Err(EnvelopeError::invalid_argument(
            "Quantity must be greater than 0",
        ));
    }

    let order_type = request
        .order_type
        .parse::<OrderType>()
        .map_err(|e| EnvelopeError::invalid_argument(e.to_string()))?;
    let order_side = request
        .order_side
        .parse::<OrderSide>()
        .map_err(|e| EnvelopeError::invalid_argument(e.to_string()))?;

    match request.price {
        Some(price) if !price.is_finite() || price <= 0.0 => {
            return Err(EnvelopeError::invalid_argument(
                "Price must be greater than 0",
            ));
        }
        None if order_type.requires_price() => {
            return Err(EnvelopeError::invalid_argument(format!(
                "Price is required for {order_type} orders"
            )));
        }
        _ => {}
    }

    Ok(SubmitOrderCommand {
        user_id: user_id.to_string(),
        symbol,
        order_type,
        order_side,
        quantity: request.quantity,
        price: request.price,
    })
}

fn status_message(status: OrderStatus) -> String {
    format!("Order is currently {status}")
}

fn order_details(view: OrderView) -> OrderDetails {
    OrderDetails {
        order_id: view.order_id,
        user_id: view.user_id,
        symbol: view.symbol,
        order_type: view.order_type.to_string(),
        order_side: view.order_side.to_string(),
        quantity: view.quantity,
        price: view.price,
        status: view.status.to_string(),
        created_at: view.created_at.to_rfc3339(),
        updated_at: view.updated_at.to_rfc3339(),
        executed_at: view.executed_at.map(|at| at.to_rfc3339()),
        execution_price: view.execution_price,
        // Not computed yet; clients treat 0 as unknown.
        estimated_value: 0.0,
        market_price_at_submission: view.market_price_at_submission,
    }
}

#[tonic::async_trait]
impl OrderService for OrderServiceImpl {
    async fn submit_order(
        &self,
        request: Request<SubmitOrderRequest>,
    ) -> Result<Response<SubmitOrderResponse>, Status> {
        tracing::debug!("SubmitOrder called");
        respond(self.resolve_submit(request).await)
    }

    async fn get_order_details(
        &self,
        request: Request<GetOrderDetailsRequest>,
    ) -> Result<Response<GetOrderDetailsResponse>, Status> {
        tracing::debug!("GetOrderDetails called");
        respond(self.resolve_details(request).await)
    }

    async fn get_order_status(
        &self,
        request: Request<GetOrderStatusRequest>,
    ) -> Result<Response<GetOrderStatusResponse>, Status> {
        tracing::debug!("GetOrderStatus called");
        respond(self.resolve_status(request).await)
    }

    async fn cancel_order(
        &self,
        request: Request<CancelOrderRequest>,
    ) -> Result<Response<CancelOrderResponse>, Status> {
        tracing::debug!("CancelOrder called");
        respond(self.resolve_cancel(request).await)
    }
}
