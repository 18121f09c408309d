//! Market quote read model.

use serde::{Deserialize, Serialize};

/// Latest quote for a tradable asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    /// Ticker symbol (upper case).
    pub symbol: String,
    /// Display name of the asset.
    pub name: String,
    /// Last traded price.
    pub last_quote: f64,
    /// Asset category id (same ids as position categories).
    pub category: i32,
}
