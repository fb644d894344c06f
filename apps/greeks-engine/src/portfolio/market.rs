//! Market state supplied by the caller for each evaluation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::pricing::PricingError;

/// Spot, rate and valuation date at which a portfolio is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketState {
    spot_price: f64,
    risk_free_rate: f64,
    valuation_date: NaiveDate,
}

/// Risk-free rate used when none is supplied.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.05;

impl MarketState {
    /// Create a market state at [`DEFAULT_RISK_FREE_RATE`].
    pub fn new(spot_price: f64, valuation_date: NaiveDate) -> Result<Self, PricingError> {
        validate_spot(spot_price)?;
        Ok(Self {
            spot_price,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            valuation_date,
        })
    }

    /// Set the annualized risk-free rate.
    pub fn with_risk_free_rate(mut self, risk_free_rate: f64) -> Result<Self, PricingError> {
        if !risk_free_rate.is_finite() {
            return Err(PricingError::InvalidInput {
                message: format!("Risk-free rate must be finite, got: {risk_free_rate}"),
            });
        }
        self.risk_free_rate = risk_free_rate;
        Ok(self)
    }

    /// Get the spot price.
    #[must_use]
    pub const fn spot_price(&self) -> f64 {
        self.spot_price
    }

    /// Get the risk-free rate.
    #[must_use]
    pub const fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// Get the valuation date.
    #[must_use]
    pub const fn valuation_date(&self) -> NaiveDate {
        self.valuation_date
    }
}

pub(crate) fn validate_spot(spot: f64) -> Result<(), PricingError> {
    if spot.is_finite() && spot > 0.0 {
        Ok(())
    } else {
        Err(PricingError::InvalidInput {
            message: format!("Spot price must be positive, got: {spot}"),
        })
    }
}
