//! PositionService Handler
//!
//! Positions are projected from the aggregation use case. The projection
//! manufactures `position_id`, `position_type`, `status` and the timestamps
//! at response time; they must come from the position store once one exists.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tonic::{Request, Response, Status};

use super::envelope::{CallOutcome, EnvelopeError, respond};
use super::guard::authorize;
use super::proto::hub::v1::{
    CategoryAggregation, CreatePositionRequest, CreatePositionResponse,
    GetPositionAggregationRequest, GetPositionAggregationResponse, GetPositionsRequest,
    GetPositionsResponse, Position, PositionAggregation, UpdatePositionRequest,
    UpdatePositionResponse, position_service_server::PositionService,
};
use crate::application::container::Container;
use crate::application::ports::PositionAggregationUseCase;
use crate::domain::position::{AggregationSummary, AssetSummary, CategorySummary};

const POSITION_TYPE_LONG: &str = "LONG";
const POSITION_STATUS_ACTIVE: &str = "ACTIVE";

/// `PositionService` implementation.
#[derive(Clone)]
pub struct PositionServiceImpl {
    aggregation: Arc<dyn PositionAggregationUseCase>,
}

impl PositionServiceImpl {
    /// Create a handler from its port.
    #[must_use]
    pub fn new(aggregation: Arc<dyn PositionAggregationUseCase>) -> Self {
        Self { aggregation }
    }

    /// Resolve the port from a container.
    #[must_use]
    pub fn from_container(container: &dyn Container) -> Self {
        Self::new(container.position_aggregation_use_case())
    }

    async fn resolve_positions(
        &self,
        request: Request<GetPositionsRequest>,
    ) -> CallOutcome<GetPositionsResponse> {
        let principal = match authorize(&request, &request.get_ref().user_id) {
            Ok(principal) => principal,
            Err(status) => return status.into(),
        };

        match self.aggregation.execute(principal.user_id()).await {
            Ok(summary) => {
                let positions = project_positions(principal.user_id(), &summary, Utc::now());
                let count = positions.len();
                CallOutcome::success(
                    format!("Retrieved {count} positions"),
                    GetPositionsResponse {
                        api_response: None,
                        positions,
                        total_count: to_i32(count),
                    },
                )
            }
            Err(error) => {
                tracing::warn!(user_id = %principal, error = %error, "Position lookup failed");
                EnvelopeError::from_use_case("Failed to get positions", &error).into()
            }
        }
    }

    async fn resolve_aggregation(
        &self,
        request: Request<GetPositionAggregationRequest>,
    ) -> CallOutcome<GetPositionAggregationResponse> {
        let principal = match authorize(&request, &request.get_ref().user_id) {
            Ok(principal) => principal,
            Err(status) => return status.into(),
        };

        match self.aggregation.execute(principal.user_id()).await {
            Ok(summary) => CallOutcome::success(
                "Position aggregation retrieved successfully",
                GetPositionAggregationResponse {
                    api_response: None,
                    aggregation: Some(aggregation(principal.user_id(), &summary, Utc::now())),
                },
            ),
            Err(error) => {
                tracing::warn!(user_id = %principal, error = %error, "Position aggregation failed");
                EnvelopeError::from_use_case("Failed to get position aggregation", &error).into()
            }
        }
    }
}

fn to_i32(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

fn project_position(user_id: &str, asset: &AssetSummary, now: DateTime<Utc>) -> Position {
    let now = now.to_rfc3339();
    Position {
        position_id: format!("pos-{}", asset.symbol),
        user_id: user_id.to_string(),
        symbol: asset.symbol.clone(),
        quantity: asset.quantity,
        average_price: asset.average_price,
        total_investment: asset.total_investment(),
        current_price: asset.last_price,
        market_value: asset.market_value(),
        unrealized_pnl: asset.unrealized_pnl(),
        unrealized_pnl_pct: asset.unrealized_pnl_pct(),
        position_type: POSITION_TYPE_LONG.to_string(),
        status: POSITION_STATUS_ACTIVE.to_string(),
        created_at: now.clone(),
        updated_at: now,
    }
}

/// Flatten every category's assets into positions.
fn project_positions(
    user_id: &str,
    summary: &AggregationSummary,
    now: DateTime<Utc>,
) -> Vec<Position> {
    summary
        .categories
        .iter()
        .flat_map(|category| category.assets.iter())
        .map(|asset| project_position(user_id, asset, now))
        .collect()
}

fn category_aggregation(category: &CategorySummary) -> CategoryAggregation {
    CategoryAggregation {
        category_id: category.category,
        category_name: format!("Category {}", category.category),
        total_invested: category.total_invested,
        total_current_value: category.current_total,
        total_unrealized_pnl: category.pnl,
        unrealized_pnl_pct: category.pnl_percentage,
        position_count: to_i32(category.assets.len()),
        // Not computed yet.
        weight_pct: 0.0,
    }
}

fn aggregation(
    user_id: &str,
    summary: &AggregationSummary,
    now: DateTime<Utc>,
) -> PositionAggregation {
    let positions = project_positions(user_id, summary, now);
    let total_positions = to_i32(positions.len());
    PositionAggregation {
        total_invested: summary.total_invested,
        total_current_value: summary.current_total,
        total_unrealized_pnl: summary.current_total - summary.total_invested,
        // Not computed yet.
        total_unrealized_pnl_pct: 0.0,
        total_positions,
        active_positions: total_positions,
        categories: summary.categories.iter().map(category_aggregation).collect(),
        positions,
    }
}

#[tonic::async_trait]
impl PositionService for PositionServiceImpl {
    async fn get_positions(
        &self,
        request: Request<GetPositionsRequest>,
    ) -> Result<Response<GetPositionsResponse>, Status> {
        tracing::debug!("GetPositions called");
        respond(self.resolve_positions(request).await)
    }

    async fn get_position_aggregation(
        &self,
        request: Request<GetPositionAggregationRequest>,
    ) -> Result<Response<GetPositionAggregationResponse>, Status> {
        tracing::debug!("GetPositionAggregation called");
        respond(self.resolve_aggregation(request).await)
    }

    async fn create_position(
        &self,
        request: Request<CreatePositionRequest>,
    ) -> Result<Response<CreatePositionResponse>, Status> {
        tracing::debug!("CreatePosition called");
        authorize(&request, &request.get_ref().user_id)?;
        respond(EnvelopeError::unimplemented("Position creation is not implemented").into())
    }

    async fn update_position(
        &self,
        request: Request<UpdatePositionRequest>,
    ) -> Result<Response<UpdatePositionResponse>, Status> {
        tracing::debug!("UpdatePosition called");
        authorize(&request, &request.get_ref().user_id)?;
        respond(EnvelopeError::unimplemented("Position update is not implemented").into())
    }
}
