//! Position Aggregation Read Models
//!
//! The position aggregation use case returns a user's holdings grouped by
//! asset category. These are derived figures, not stored rows.

use serde::{Deserialize, Serialize};

/// One holding inside a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSummary {
    /// Ticker symbol.
    pub symbol: String,
    /// Quantity held.
    pub quantity: f64,
    /// Average acquisition price.
    pub average_price: f64,
    /// Last known market price.
    pub last_price: f64,
    /// Asset category id.
    pub category: i32,
}

impl AssetSummary {
    /// Amount paid for the holding.
    #[must_use]
    pub fn total_investment(&self) -> f64 {
        self.quantity * self.average_price
    }

    /// Value at the last known price.
    #[must_use]
    pub fn market_value(&self) -> f64 {
        self.quantity * self.last_price
    }

    /// Market value minus investment.
    #[must_use]
    pub fn unrealized_pnl(&self) -> f64 {
        self.market_value() - self.total_investment()
    }

    /// Unrealized P&L as a percentage of the investment, 0 when nothing was invested.
    #[must_use]
    pub fn unrealized_pnl_pct(&self) -> f64 {
        let invested = self.total_investment();
        if invested > 0.0 {
            self.unrealized_pnl() / invested * 100.0
        } else {
            0.0
        }
    }
}

/// Holdings of one asset category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// Category id.
    pub category: i32,
    /// Sum of investments.
    pub total_invested: f64,
    /// Sum of market values.
    pub current_total: f64,
    /// `current_total - total_invested`.
    pub pnl: f64,
    /// P&L percentage over `total_invested`.
    pub pnl_percentage: f64,
    /// Assets in this category.
    pub assets: Vec<AssetSummary>,
}

impl CategorySummary {
    /// Build a category summary by summing its assets.
    #[must_use]
    pub fn from_assets(category: i32, assets: Vec<AssetSummary>) -> Self {
        let total_invested: f64 = assets.iter().map(AssetSummary::total_investment).sum();
        let current_total: f64 = assets.iter().map(AssetSummary::market_value).sum();
        let pnl = current_total - total_invested;
        let pnl_percentage = if total_invested > 0.0 {
            pnl / total_invested * 100.0
        } else {
            0.0
        };
        Self {
            category,
            total_invested,
            current_total,
            pnl,
            pnl_percentage,
            assets,
        }
    }
}

/// A user's full position aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationSummary {
    /// Sum over all categories.
    pub total_invested: f64,
    /// Sum over all categories.
    pub current_total: f64,
    /// Per-category breakdown.
    pub categories: Vec<CategorySummary>,
}

impl AggregationSummary {
    /// Build an aggregation from category summaries.
    #[must_use]
    pub fn from_categories(categories: Vec<CategorySummary>) -> Self {
        Self {
            total_invested: categories.iter().map(|c| c.total_invested).sum(),
            current_total: categories.iter().map(|c| c.current_total).sum(),
            categories,
        }
    }

    /// Number of assets over all categories.
    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.categories.iter().map(|c| c.assets.len()).sum()
    }
}
