//! Tabular views of a portfolio.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::aggregate::PortfolioAggregate;
use crate::pricing::OptionKind;

/// Leg counts and spread of a portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Number of legs.
    pub total_positions: usize,
    /// Legs with positive quantity.
    pub long_positions: usize,
    /// Legs with negative quantity.
    pub short_positions: usize,
    /// Distinct strikes.
    pub unique_strikes: usize,
    /// Distinct expiration dates.
    pub unique_expirations: usize,
    /// Σ quantity.
    pub net_quantity: f64,
}

/// One row of the positions table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionRow {
    /// Index in the portfolio, usable with `remove_position`.
    pub index: usize,
    /// Expiration date.
    pub expiration: NaiveDate,
    /// Strike price.
    pub strike: f64,
    /// Call or put.
    pub kind: OptionKind,
    /// Signed quantity.
    pub quantity: f64,
    /// Leg volatility.
    pub volatility: f64,
    /// Recorded fill price, if any.
    pub entry_price: Option<f64>,
    /// Whole days to expiration at the row's valuation date.
    pub days_to_expiry: i64,
}

/// One leg's quantity-weighted Greeks at a simulated date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionGreeks {
    /// Quantity-weighted Greeks of the leg.
    #[serde(flatten)]
    pub aggregate: PortfolioAggregate,
    /// Whole days left at the simulated date; zero inside the expiry threshold.
    pub remaining_days: i64,
}

/// Portfolio cost basis and whether any of it was estimated.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostBasis {
    /// Σ entry price × quantity.
    pub value: f64,
    /// Legs whose entry price was estimated from the model.
    pub estimated_legs: usize,
    /// True when at least one leg had no recorded fill.
    pub is_estimated: bool,
}
