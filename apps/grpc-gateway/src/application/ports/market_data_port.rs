//! Market Data Port

use async_trait::async_trait;

use crate::application::errors::UseCaseError;
use crate::domain::market_data::MarketQuote;

/// Resolves quotes for a set of symbols.
#[async_trait]
pub trait MarketDataUseCase: Send + Sync {
    /// Quotes for `symbols` (upper case, unique). Unknown symbols are omitted.
    async fn execute(&self, symbols: &[String]) -> Result<Vec<MarketQuote>, UseCaseError>;
}
