//! Option Contract Specification

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::OptionsError;
use crate::pricing::{DAYS_PER_YEAR, OptionKind};

/// Immutable description of one European option contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    /// Strike price.
    strike: f64,
    /// Call or put.
    kind: OptionKind,
    /// Expiration date.
    expiration: NaiveDate,
}

impl OptionSpec {
    /// Create a new contract. The strike must be positive and finite.
    pub fn new(strike: f64, kind: OptionKind, expiration: NaiveDate) -> Result<Self, OptionsError> {
        if !strike.is_finite() || strike <= 0.0 {
            return Err(OptionsError::InvalidContract {
                message: format!("strike must be positive, got: {strike}"),
            });
        }
        Ok(Self {
            strike,
            kind,
            expiration,
        })
    }

    /// Create a call contract.
    pub fn call(strike: f64, expiration: NaiveDate) -> Result<Self, OptionsError> {
        Self::new(strike, OptionKind::Call, expiration)
    }

    /// Create a put contract.
    pub fn put(strike: f64, expiration: NaiveDate) -> Result<Self, OptionsError> {
        Self::new(strike, OptionKind::Put, expiration)
    }

    /// Get the strike price.
    #[must_use]
    pub const fn strike(&self) -> f64 {
        self.strike
    }

    /// Get the option kind.
    #[must_use]
    pub const fn kind(&self) -> OptionKind {
        self.kind
    }

    /// Get the expiration date.
    #[must_use]
    pub const fn expiration(&self) -> NaiveDate {
        self.expiration
    }

    /// Whole calendar days to expiration, clamped at zero.
    #[must_use]
    pub fn days_to_expiry(&self, valuation_date: NaiveDate) -> i64 {
        (self.expiration - valuation_date).num_days().max(0)
    }

    /// Time to expiration in years.
    #[must_use]
    pub fn time_to_maturity(&self, valuation_date: NaiveDate) -> f64 {
        self.days_to_expiry(valuation_date) as f64 / DAYS_PER_YEAR
    }

    /// Check if the contract has expired as of a date.
    #[must_use]
    pub fn is_expired(&self, as_of: NaiveDate) -> bool {
        as_of >= self.expiration
    }

    /// Payoff at expiration for one unit.
    #[must_use]
    pub fn intrinsic_value(&self, spot: f64) -> f64 {
        self.kind.intrinsic_value(spot, self.strike)
    }
}
