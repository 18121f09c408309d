//! Order Ports

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::errors::UseCaseError;
use crate::domain::order::{OrderSide, OrderStatus, OrderType};

/// Command to submit a new order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitOrderCommand {
    /// Owner of the order.
    pub user_id: String,
    /// Upper-cased ticker symbol.
    pub symbol: String,
    /// Order type.
    pub order_type: OrderType,
    /// Order side.
    pub order_side: OrderSide,
    /// Quantity (always > 0).
    pub quantity: f64,
    /// Limit/stop price, if any.
    pub price: Option<f64>,
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitOrderResult {
    /// Assigned order id.
    pub order_id: String,
    /// Status right after submission.
    pub status: OrderStatus,
    /// Estimated execution price.
    pub estimated_price: Option<f64>,
    /// Market price at submission.
    pub market_price: Option<f64>,
}

/// Snapshot of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    /// Order id.
    pub order_id: String,
    /// Owner.
    pub user_id: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Order type.
    pub order_type: OrderType,
    /// Order side.
    pub order_side: OrderSide,
    /// Requested quantity.
    pub quantity: f64,
    /// Requested price.
    pub price: Option<f64>,
    /// Current status.
    pub status: OrderStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Execution time.
    pub executed_at: Option<DateTime<Utc>>,
    /// Execution price.
    pub execution_price: Option<f64>,
    /// Market price when the order was submitted.
    pub market_price_at_submission: Option<f64>,
}

/// Command to cancel an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrderCommand {
    /// Order to cancel.
    pub order_id: String,
    /// Caller, who must own the order.
    pub user_id: String,
    /// Free-text reason recorded with the cancellation.
    pub reason: String,
}

/// Outcome of a successful cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrderResult {
    /// Cancelled order id.
    pub order_id: String,
    /// When the order was cancelled.
    pub cancelled_at: DateTime<Utc>,
}

/// Submits orders.
#[async_trait]
pub trait SubmitOrderUseCase: Send + Sync {
    /// Submit an order.
    async fn execute(&self, command: SubmitOrderCommand) -> Result<SubmitOrderResult, UseCaseError>;
}

/// Looks up orders.
#[async_trait]
pub trait GetOrderStatusUseCase: Send + Sync {
    /// Fetch the order `order_id` on behalf of `user_id`.
    async fn execute(&self, order_id: &str, user_id: &str) -> Result<OrderView, UseCaseError>;
}

/// Cancels orders.
#[async_trait]
pub trait CancelOrderUseCase: Send + Sync {
    /// Cancel an order. Cancelling a terminal order is a
    /// [`UseCaseError::FailedPrecondition`].
    async fn execute(&self, command: CancelOrderCommand) -> Result<CancelOrderResult, UseCaseError>;
}
