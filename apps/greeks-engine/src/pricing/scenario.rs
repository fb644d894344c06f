//! Single-option scenario sweeps.
//!
//! Each sweep varies one input along an ordered axis, holds every other
//! input fixed, and evaluates the whole axis through one batched call.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{PricingError, validate_inputs};
use super::greeks::{DAYS_PER_YEAR, GreeksCalculator, GreeksResult};
use super::kind::OptionKind;

/// Time to expiry (years) at which a time-decay sweep ends.
pub const TIME_DECAY_FLOOR: f64 = 0.001;

/// Absolute floor applied to swept volatilities.
pub const MIN_SCENARIO_VOLATILITY: f64 = 0.01;

/// `n` evenly spaced values from `start` to `end`, both inclusive.
#[must_use]
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// `n` geometrically spaced values from `start` to `end`, both inclusive.
///
/// Both bounds must be positive.
#[must_use]
pub fn logspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    linspace(start.ln(), end.ln(), n)
        .into_iter()
        .enumerate()
        .map(|(i, x)| match i {
            0 => start,
            _ if i == n - 1 => end,
            _ => x.exp(),
        })
        .collect()
}

/// Starting point of a time-decay sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeHorizon {
    /// Time to expiry in years.
    Years(f64),
    /// Calendar days to expiry.
    Days(u32),
}

impl Default for TimeHorizon {
    fn default() -> Self {
        Self::Days(30)
    }
}

impl TimeHorizon {
    /// Horizon in years.
    #[must_use]
    pub fn years(self) -> f64 {
        match self {
            Self::Years(t) => t,
            Self::Days(days) => f64::from(days) / DAYS_PER_YEAR,
        }
    }
}

/// One point of a spot sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioPoint {
    /// Spot price at this point.
    pub spot: f64,
    /// Price and Greeks at this spot.
    #[serde(flatten)]
    pub greeks: GreeksResult,
}

/// Spot sweep with the current-spot marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceScenario {
    /// Points in axis order.
    pub points: Vec<ScenarioPoint>,
    /// Spot the sweep was centred on.
    pub current_spot: f64,
}

/// One point of a time-decay sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeDecayPoint {
    /// Remaining calendar days (fractional).
    pub days_to_expiry: f64,
    /// Remaining time in years.
    pub time_to_expiry: f64,
    /// Price and Greeks at this time.
    #[serde(flatten)]
    pub greeks: GreeksResult,
}

/// One point of a volatility sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityPoint {
    /// Relative change applied to the current volatility, in percent.
    pub change_percent: f64,
    /// Effective volatility after the change and the floor.
    pub volatility: f64,
    /// Price and Greeks at this volatility.
    #[serde(flatten)]
    pub greeks: GreeksResult,
}

/// Volatility sweep with the current-volatility marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityScenario {
    /// Points in axis order.
    pub points: Vec<VolatilityPoint>,
    /// Volatility the sweep was centred on.
    pub current_volatility: f64,
}

impl GreeksCalculator {
    /// Sweep spot linearly over `[spot_min, spot_max]`.
    ///
    /// Missing bounds default to 50% and 150% of `current_spot`.
    pub fn price_scenario(
        &self,
        strike: f64,
        time_to_expiry: f64,
        volatility: f64,
        kind: OptionKind,
        spot_min: Option<f64>,
        spot_max: Option<f64>,
        current_spot: f64,
        num_points: usize,
    ) -> Result<PriceScenario, PricingError> {
        validate_inputs(current_spot, strike, time_to_expiry, volatility)?;

        let spot_min = spot_min.unwrap_or(current_spot * 0.5);
        let spot_max = spot_max.unwrap_or(current_spot * 1.5);
        let spots = linspace(spot_min, spot_max, num_points);
        debug!(axis = "spot", points = spots.len(), spot_min, spot_max, "Price scenario");

        let n = spots.len();
        let greeks = self.calculate_batch(
            &spots,
            &vec![strike; n],
            &vec![time_to_expiry; n],
            &vec![volatility; n],
            kind,
        )?;

        Ok(PriceScenario {
            points: spots
                .into_iter()
                .zip(greeks)
                .map(|(spot, greeks)| ScenarioPoint { spot, greeks })
                .collect(),
            current_spot,
        })
    }

    /// Sweep time to expiry from the horizon down to [`TIME_DECAY_FLOOR`].
    pub fn time_decay_scenario(
        &self,
        spot: f64,
        strike: f64,
        volatility: f64,
        kind: OptionKind,
        horizon: TimeHorizon,
        num_points: usize,
    ) -> Result<Vec<TimeDecayPoint>, PricingError> {
        let t_current = horizon.years();
        validate_inputs(spot, strike, t_current, volatility)?;

        let times = linspace(t_current, TIME_DECAY_FLOOR, num_points);
        debug!(axis = "time", points = times.len(), t_current, "Time decay scenario");

        let n = times.len();
        let greeks = self.calculate_batch(
            &vec![spot; n],
            &vec![strike; n],
            &times,
            &vec![volatility; n],
            kind,
        )?;

        Ok(times
            .into_iter()
            .zip(greeks)
            .map(|(t, greeks)| TimeDecayPoint {
                days_to_expiry: t * DAYS_PER_YEAR,
                time_to_expiry: t,
                greeks,
            })
            .collect())
    }

    /// Sweep volatility over relative changes `[change_min, change_max]`.
    ///
    /// A change of -0.5 halves the current volatility. Effective values are
    /// floored at [`MIN_SCENARIO_VOLATILITY`].
    pub fn volatility_scenario(
        &self,
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        current_volatility: f64,
        kind: OptionKind,
        change_min: f64,
        change_max: f64,
        num_points: usize,
    ) -> Result<VolatilityScenario, PricingError> {
        validate_inputs(spot, strike, time_to_expiry, current_volatility)?;

        let changes = linspace(change_min, change_max, num_points);
        let vols: Vec<f64> = changes
            .iter()
            .map(|c| (current_volatility * (1.0 + c)).max(MIN_SCENARIO_VOLATILITY))
            .collect();
        debug!(axis = "volatility", points = vols.len(), current_volatility, "Volatility scenario");

        let n = vols.len();
        let greeks = self.calculate_batch(
            &vec![spot; n],
            &vec![strike; n],
            &vec![time_to_expiry; n],
            &vols,
            kind,
        )?;

        Ok(VolatilityScenario {
            points: changes
                .into_iter()
                .zip(vols)
                .zip(greeks)
                .map(|((change, volatility), greeks)| VolatilityPoint {
                    change_percent: change * 100.0,
                    volatility,
                    greeks,
                })
                .collect(),
            current_volatility,
        })
    }
}
