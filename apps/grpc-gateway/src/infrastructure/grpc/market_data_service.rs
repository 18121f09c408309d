//! MarketDataService Handler

use std::collections::HashSet;
use std::sync::Arc;

use tonic::{Request, Response, Status};

use super::envelope::{CallOutcome, EnvelopeError, respond};
use super::guard::principal_of;
use super::proto::hub::v1::{
    GetMarketDataRequest, GetMarketDataResponse, MarketData,
    market_data_service_server::MarketDataService,
};
use crate::application::container::Container;
use crate::application::ports::MarketDataUseCase;
use crate::domain::market_data::MarketQuote;

/// `MarketDataService` implementation.
#[derive(Clone)]
pub struct MarketDataServiceImpl {
    market_data: Arc<dyn MarketDataUseCase>,
}

impl MarketDataServiceImpl {
    /// Create a handler from its port.
    #[must_use]
    pub fn new(market_data: Arc<dyn MarketDataUseCase>) -> Self {
        Self { market_data }
    }

    /// Resolve the port from a container.
    #[must_use]
    pub fn from_container(container: &dyn Container) -> Self {
        Self::new(container.market_data_use_case())
    }

    async fn resolve(
        &self,
        request: Request<GetMarketDataRequest>,
    ) -> CallOutcome<GetMarketDataResponse> {
        if let Err(status) = principal_of(&request) {
            return status.into();
        }

        let symbols = normalize_symbols(&request.get_ref().symbols);
        if symbols.is_empty() {
            return EnvelopeError::invalid_argument("At least one symbol is required").into();
        }

        match self.market_data.execute(&symbols).await {
            Ok(quotes) => {
                let market_data: Vec<MarketData> = quotes.into_iter().map(market_data).collect();
                CallOutcome::success(
                    format!("Retrieved {} market data entries", market_data.len()),
                    GetMarketDataResponse {
                        api_response: None,
                        market_data,
                    },
                )
            }
            Err(error) => {
                tracing::warn!(error = %error, "Market data lookup failed");
                EnvelopeError::from_use_case("Failed to get market data", &error).into()
            }
        }
    }
}

/// Trim, upper-case and de-duplicate, keeping first-seen order.
fn normalize_symbols(symbols: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    symbols
        .iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

fn market_data(quote: MarketQuote) -> MarketData {
    MarketData {
        symbol: quote.symbol,
        name: quote.name,
        last_quote: quote.last_quote,
        category: quote.category,
    }
}

#[tonic::async_trait]
impl MarketDataService for MarketDataServiceImpl {
    async fn get_market_data(
        &self,
        request: Request<GetMarketDataRequest>,
    ) -> Result<Response<GetMarketDataResponse>, Status> {
        tracing::debug!(symbols = request.get_ref().symbols.len(), "GetMarketData called");
        respond(self.resolve(request).await)
    }
}
