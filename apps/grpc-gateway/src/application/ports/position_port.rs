//! Position Port

use async_trait::async_trait;

use crate::application::errors::UseCaseError;
use crate::domain::position::AggregationSummary;

/// Aggregates a user's positions by category.
#[async_trait]
pub trait PositionAggregationUseCase: Send + Sync {
    /// Aggregate positions for `user_id`.
    async fn execute(&self, user_id: &str) -> Result<AggregationSummary, UseCaseError>;
}
