//! Spot axis heuristics.
//!
//! Far out-of-the-money legs need a wide axis to show the full payoff
//! shape; at-the-money structures do not.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::PortfolioError;

/// Floor applied to the lower bound of smart and logarithmic axes.
pub const MIN_AXIS_SPOT: f64 = 1.0;

/// How a default spot axis is derived from the spot and the held strikes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeMode {
    /// `[min(S·0.01, Kmin·0.1), max(S·10, Kmax·10)]`, lower bound floored at 1.
    #[default]
    #[serde(alias = "log")]
    Smart,
    /// `[S·0.01, S·100]`.
    Linear,
    /// `[Kmin·0.1, Kmax·10]`.
    StrikeBased,
}

impl RangeMode {
    /// Every mode, in display order.
    pub const ALL: [Self; 3] = [Self::Smart, Self::Linear, Self::StrikeBased];

    /// Configuration name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Smart => "smart",
            Self::Linear => "linear",
            Self::StrikeBased => "strike_based",
        }
    }
}

impl std::fmt::Display for RangeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RangeMode {
    type Err = PortfolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smart" | "log" => Ok(Self::Smart),
            "linear" => Ok(Self::Linear),
            "strike_based" => Ok(Self::StrikeBased),
            other => Err(PortfolioError::invalid_range(format!(
                "unknown range mode '{other}', expected one of smart, linear, strike_based"
            ))),
        }
    }
}

/// Default spot axis `(spot_min, spot_max)` for a portfolio.
///
/// Without any strikes the axis is `[0.5·S, 1.5·S]` whatever the mode.
#[must_use]
pub fn price_range(mode: RangeMode, spot: f64, strikes: &[f64]) -> (f64, f64) {
    let Some((min_strike, max_strike)) = strike_bounds(strikes) else {
        return (spot * 0.5, spot * 1.5);
    };

    match mode {
        RangeMode::Smart => {
            let spot_min = (spot * 0.01).min(min_strike * 0.1).max(MIN_AXIS_SPOT);
            let spot_max = (spot * 10.0).max(max_strike * 10.0);
            (spot_min, spot_max)
        }
        RangeMode::Linear => (spot * 0.01, spot * 100.0),
        RangeMode::StrikeBased => (min_strike * 0.1, max_strike * 10.0),
    }
}

fn strike_bounds(strikes: &[f64]) -> Option<(f64, f64)> {
    let (first, rest) = strikes.split_first()?;
    Some(
        rest.iter()
            .fold((*first, *first), |(lo, hi), &k| (lo.min(k), hi.max(k))),
    )
}
