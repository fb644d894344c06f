//! Strategy template configuration.

use serde::{Deserialize, Serialize};

/// Parameters used when populating a portfolio from a named template.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Volatility assigned to every template leg.
    #[serde(default = "default_volatility")]
    pub default_volatility: f64,
    /// Days to the near expiration.
    #[serde(default = "default_expiry_days")]
    pub expiry_days: u32,
    /// Days to the far expiration (calendar spreads).
    #[serde(default = "default_far_expiry_days")]
    pub far_expiry_days: u32,
    /// Strike grid spacing; also the ATM rounding unit.
    #[serde(default = "default_strike_step")]
    pub strike_step: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            default_volatility: default_volatility(),
            expiry_days: default_expiry_days(),
            far_expiry_days: default_far_expiry_days(),
            strike_step: default_strike_step(),
        }
    }
}

const fn default_volatility() -> f64 {
    1.0
}

const fn default_expiry_days() -> u32 {
    30
}

const fn default_far_expiry_days() -> u32 {
    60
}

const fn default_strike_step() -> f64 {
    100.0
}
