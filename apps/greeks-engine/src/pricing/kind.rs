//! Option kind (call or put).

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::PricingError;

/// Option kind, resolved once at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionKind {
    /// Call option (right to buy).
    Call,
    /// Put option (right to sell).
    Put,
}

impl OptionKind {
    /// Payoff at expiration for one unit.
    #[must_use]
    pub fn intrinsic_value(self, spot: f64, strike: f64) -> f64 {
        match self {
            Self::Call => (spot - strike).max(0.0),
            Self::Put => (strike - spot).max(0.0),
        }
    }

    /// Delta at expiration: +1/-1 in the money, 0 otherwise (including at the strike).
    #[must_use]
    pub fn expiry_delta(self, spot: f64, strike: f64) -> f64 {
        match self {
            Self::Call if spot > strike => 1.0,
            Self::Put if spot < strike => -1.0,
            _ => 0.0,
        }
    }

    /// Check if this is a call.
    #[must_use]
    pub const fn is_call(self) -> bool {
        matches!(self, Self::Call)
    }
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "C"),
            Self::Put => write!(f, "P"),
        }
    }
}

impl FromStr for OptionKind {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "call" => Ok(Self::Call),
            "p" | "put" => Ok(Self::Put),
            _ => Err(PricingError::InvalidOptionKind {
                value: s.to_string(),
            }),
        }
    }
}
