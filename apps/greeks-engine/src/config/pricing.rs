//! Pricing model configuration.

use serde::{Deserialize, Serialize};

/// Pricing model configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Risk-free rate (annualized).
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
    /// Time to expiry (years) at or below which options are valued at intrinsic.
    #[serde(default = "default_expiry_threshold")]
    pub expiry_threshold_years: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: default_risk_free_rate(),
            expiry_threshold_years: default_expiry_threshold(),
        }
    }
}

const fn default_risk_free_rate() -> f64 {
    0.05
}

// About 8.76 hours
const fn default_expiry_threshold() -> f64 {
    0.001
}
