//! Position value object: one signed option leg.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::contract::OptionSpec;
use crate::pricing::{DAYS_PER_YEAR, OptionKind};

/// Volatility assigned when a leg is created without one.
pub const DEFAULT_VOLATILITY: f64 = 1.0;

/// One option leg in a portfolio.
///
/// Quantity is signed: positive is long, negative is short.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    spec: OptionSpec,
    quantity: f64,
    volatility: f64,
    entry_price: Option<f64>,
}

impl Position {
    /// Create a leg at [`DEFAULT_VOLATILITY`] with no recorded fill.
    #[must_use]
    pub const fn new(spec: OptionSpec, quantity: f64) -> Self {
        Self {
            spec,
            quantity,
            volatility: DEFAULT_VOLATILITY,
            entry_price: None,
        }
    }

    /// Set the leg's volatility (decimal, 1.0 = 100%).
    #[must_use]
    pub const fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }

    /// Record the per-unit fill price.
    #[must_use]
    pub const fn with_entry_price(mut self, entry_price: f64) -> Self {
        self.entry_price = Some(entry_price);
        self
    }

    /// Get the contract.
    #[must_use]
    pub const fn spec(&self) -> &OptionSpec {
        &self.spec
    }

    /// Get the strike price.
    #[must_use]
    pub const fn strike(&self) -> f64 {
        self.spec.strike()
    }

    /// Get the option kind.
    #[must_use]
    pub const fn kind(&self) -> OptionKind {
        self.spec.kind()
    }

    /// Get the expiration date.
    #[must_use]
    pub const fn expiration(&self) -> NaiveDate {
        self.spec.expiration()
    }

    /// Get the signed quantity.
    #[must_use]
    pub const fn quantity(&self) -> f64 {
        self.quantity
    }

    /// Get the volatility.
    #[must_use]
    pub const fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Get the recorded fill price, if any.
    #[must_use]
    pub const fn entry_price(&self) -> Option<f64> {
        self.entry_price
    }

    /// True when no fill price was recorded and cost basis must be estimated.
    #[must_use]
    pub const fn is_estimated_entry(&self) -> bool {
        self.entry_price.is_none()
    }

    /// Check if the leg is long.
    #[must_use]
    pub fn is_long(&self) -> bool {
        self.quantity > 0.0
    }

    /// Check if the leg is short.
    #[must_use]
    pub fn is_short(&self) -> bool {
        self.quantity < 0.0
    }

    /// Whole calendar days to expiration, clamped at zero.
    #[must_use]
    pub fn days_to_expiry(&self, valuation_date: NaiveDate) -> i64 {
        self.spec.days_to_expiry(valuation_date)
    }

    /// Time to expiration in years.
    #[must_use]
    pub fn time_to_maturity(&self, valuation_date: NaiveDate) -> f64 {
        self.spec.time_to_maturity(valuation_date)
    }

    /// Time to expiration in years after `elapsed_days` have passed since
    /// `valuation_date`. Fractional days are allowed; the result is clamped
    /// at zero.
    #[must_use]
    pub fn time_to_maturity_after(&self, valuation_date: NaiveDate, elapsed_days: f64) -> f64 {
        let days = (self.spec.expiration() - valuation_date).num_days() as f64;
        (days - elapsed_days).max(0.0) / DAYS_PER_YEAR
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.quantity > 0.0 { "+" } else { "" };
        write!(
            f,
            "{sign}{} {} {} exp:{}",
            self.quantity,
            self.kind(),
            self.strike(),
            self.expiration().format("%Y-%m-%d")
        )
    }
}
