//! Portfolio scenario sweeps.
//!
//! A sweep evaluates the aggregate along one axis (spot, elapsed time or
//! volatility) with everything else held fixed. Each leg is priced over
//! the whole axis in one batched call, so every point equals what
//! [`PortfolioAggregator::aggregate_greeks`] returns for it.

use chrono::{Days, NaiveDate};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::aggregate::PortfolioAggregate;
use super::analyzer::PortfolioAggregator;
use super::error::PortfolioError;
use super::range::{MIN_AXIS_SPOT, RangeMode, price_range};
use crate::options::Position;
use crate::pricing::{linspace, logspace};

/// Spot sweep parameters. Unset fields fall back to the market state and
/// the analysis configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotSweep {
    /// Lower axis bound.
    pub spot_min: Option<f64>,
    /// Upper axis bound.
    pub spot_max: Option<f64>,
    /// Axis length.
    pub num_points: Option<usize>,
    /// Valuation date.
    pub valuation_date: Option<NaiveDate>,
    /// Heuristic for missing bounds.
    pub range_mode: Option<RangeMode>,
    /// Space points geometrically; the lower bound is floored at 1.
    pub use_log_scale: bool,
    /// Factor applied to every leg's volatility.
    pub vol_multiplier: f64,
    /// Days added to the valuation date before measuring T.
    pub time_offset_days: i64,
}

impl Default for SpotSweep {
    fn default() -> Self {
        Self {
            spot_min: None,
            spot_max: None,
            num_points: None,
            valuation_date: None,
            range_mode: None,
            use_log_scale: false,
            vol_multiplier: 1.0,
            time_offset_days: 0,
        }
    }
}

/// Aggregate at one spot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotPoint {
    /// Spot price.
    pub spot: f64,
    /// Aggregate at this spot.
    #[serde(flatten)]
    pub aggregate: PortfolioAggregate,
}

/// Aggregate Greeks along a spot axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotSeries {
    /// Points in axis order.
    pub points: Vec<SpotPoint>,
    /// Market spot marker.
    pub current_spot: f64,
}

/// Profit and loss at one spot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PnlPoint {
    /// Spot price.
    pub spot: f64,
    /// Position value minus cost basis.
    pub pnl: f64,
    /// Aggregate at this spot.
    #[serde(flatten)]
    pub aggregate: PortfolioAggregate,
}

/// Profit and loss along a spot axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlSeries {
    /// Points in axis order.
    pub points: Vec<PnlPoint>,
    /// Cost basis every point is measured against.
    pub cost_basis: f64,
    /// Position value at the market spot under the same scenario.
    pub current_value: f64,
    /// Market spot marker.
    pub current_spot: f64,
}

/// Aggregate at one simulated date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayPoint {
    /// Days left on the axis (longest-dated leg by default).
    pub days_to_expiry: f64,
    /// Days elapsed since the valuation date.
    pub elapsed_days: f64,
    /// Simulated calendar date (elapsed days rounded down).
    pub date: NaiveDate,
    /// Aggregate at this date.
    #[serde(flatten)]
    pub aggregate: PortfolioAggregate,
}

/// Aggregate at one volatility shift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolShiftPoint {
    /// Relative change applied to every leg's volatility, in percent.
    pub change_percent: f64,
    /// Aggregate at this shift.
    #[serde(flatten)]
    pub aggregate: PortfolioAggregate,
}

/// Inputs of one leg at one axis point.
struct LegPoint {
    spot: f64,
    time_to_expiry: f64,
    volatility: f64,
}

impl PortfolioAggregator {
    /// Default spot axis for `mode`. See [`price_range`].
    #[must_use]
    pub fn smart_price_range(&self, mode: RangeMode) -> (f64, f64) {
        price_range(mode, self.market.spot_price(), &self.strikes())
    }

    /// Aggregate Greeks along a spot axis.
    #[instrument(skip(self))]
    pub fn greeks_vs_spot(&self, sweep: &SpotSweep) -> Result<SpotSeries, PortfolioError> {
        let spots = self.spot_axis(sweep)?;
        let valuation_date = sweep
            .valuation_date
            .unwrap_or_else(|| self.market.valuation_date());
        let elapsed = sweep.time_offset_days as f64;

        let aggregates = self.evaluate_axis("spot", spots.len(), |i, p| LegPoint {
            spot: spots[i],
            time_to_expiry: p.time_to_maturity_after(valuation_date, elapsed),
            volatility: p.volatility() * sweep.vol_multiplier,
        })?;

        Ok(SpotSeries {
            points: spots
                .into_iter()
                .zip(aggregates)
                .map(|(spot, aggregate)| SpotPoint { spot, aggregate })
                .collect(),
            current_spot: self.market.spot_price(),
        })
    }

    /// Profit and loss along a spot axis against the cost basis at the
    /// market spot.
    #[instrument(skip(self))]
    pub fn pnl_vs_spot(&self, sweep: &SpotSweep) -> Result<PnlSeries, PortfolioError> {
        let cost_basis = self.cost_basis(None)?;
        let series = self.greeks_vs_spot(sweep)?;
        let current_value = self
            .aggregate_greeks(
                None,
                sweep.valuation_date,
                sweep.vol_multiplier,
                sweep.time_offset_days,
            )?
            .position_value;

        Ok(PnlSeries {
            points: series
                .points
                .into_iter()
                .map(|p| PnlPoint {
                    spot: p.spot,
                    pnl: p.aggregate.position_value - cost_basis,
                    aggregate: p.aggregate,
                })
                .collect(),
            cost_basis,
            current_value,
            current_spot: series.current_spot,
        })
    }

    /// Worst expiration value over a spot range, net of cost basis.
    ///
    /// Every leg is valued at intrinsic. The range defaults to
    /// `[0.1·S, 3·S]` and the cost basis to [`Self::cost_basis`] at the
    /// market spot.
    #[instrument(skip(self))]
    pub fn max_loss_at_expiration(
        &self,
        spot_min: Option<f64>,
        spot_max: Option<f64>,
        num_points: Option<usize>,
        cost_basis: Option<f64>,
    ) -> Result<f64, PortfolioError> {
        let spot = self.market.spot_price();
        let num_points = num_points.unwrap_or(self.analysis.max_loss_points);
        let spot_min = spot_min.unwrap_or(spot * 0.1);
        let spot_max = spot_max.unwrap_or(spot * 3.0);
        validate_axis(spot_min, spot_max, num_points, 0.0)?;

        let cost_basis = match cost_basis {
            Some(value) => value,
            None => self.cost_basis(None)?,
        };

        let value_at = |s: f64| -> f64 {
            self.positions
                .iter()
                .map(|p| p.spec().intrinsic_value(s) * p.quantity())
                .sum()
        };

        let spots = linspace(spot_min, spot_max, num_points);
        let parallel = spots.len() >= self.calculator.parallel_threshold();
        debug!(axis = "expiration", points = spots.len(), parallel, "Evaluating sweep");

        let min_value = if parallel {
            spots
                .par_iter()
                .map(|&s| value_at(s))
                .reduce(|| f64::INFINITY, f64::min)
        } else {
            spots.iter().map(|&s| value_at(s)).fold(f64::INFINITY, f64::min)
        };

        Ok(min_value - cost_basis)
    }

    /// Aggregate Greeks as time passes, from the far end of `days_range`
    /// down to its near end.
    ///
    /// `days_range` is `(min_days, max_days)` and defaults to zero through
    /// the longest-dated leg's days to expiry.
    #[instrument(skip(self))]
    pub fn time_decay_curve(
        &self,
        days_range: Option<(f64, f64)>,
        num_points: Option<usize>,
        spot: Option<f64>,
    ) -> Result<Vec<DecayPoint>, PortfolioError> {
        let spot = self.resolve_spot(spot)?;
        let valuation_date = self.market.valuation_date();
        let num_points = num_points.unwrap_or(self.analysis.num_points);

        let (min_days, max_days) = days_range.unwrap_or_else(|| {
            let longest = self
                .positions
                .iter()
                .map(|p| p.days_to_expiry(valuation_date))
                .max()
                .unwrap_or(0);
            (0.0, longest as f64)
        });
        validate_axis(min_days, max_days, num_points, 0.0)?;

        let days = linspace(max_days, min_days, num_points);
        let elapsed: Vec<f64> = days.iter().map(|d| max_days - d).collect();

        let aggregates = self.evaluate_axis("time", days.len(), |i, p| LegPoint {
            spot,
            time_to_expiry: p.time_to_maturity_after(valuation_date, elapsed[i]),
            volatility: p.volatility(),
        })?;

        days.into_iter()
            .zip(elapsed)
            .zip(aggregates)
            .map(|((days_to_expiry, elapsed_days), aggregate)| -> Result<DecayPoint, PortfolioError> {
                let date = valuation_date
                    .checked_add_days(Days::new(elapsed_days.floor() as u64))
                    .ok_or_else(|| {
                        PortfolioError::invalid_range(format!(
                            "{elapsed_days} days after {valuation_date} is out of range"
                        ))
                    })?;
                Ok(DecayPoint {
                    days_to_expiry,
                    elapsed_days,
                    date,
                    aggregate,
                })
            })
            .collect()
    }

    /// Aggregate Greeks with every leg's volatility scaled by `1 + change`
    /// for each change in `change_range`.
    ///
    /// Scaled volatilities are floored at the configured minimum. Stored
    /// leg volatilities are never modified.
    #[instrument(skip(self))]
    pub fn volatility_sensitivity(
        &self,
        change_range: (f64, f64),
        num_points: Option<usize>,
        spot: Option<f64>,
        valuation_date: Option<NaiveDate>,
    ) -> Result<Vec<VolShiftPoint>, PortfolioError> {
        let spot = self.resolve_spot(spot)?;
        let valuation_date = valuation_date.unwrap_or_else(|| self.market.valuation_date());
        let num_points = num_points.unwrap_or(self.analysis.num_points);
        if num_points == 0 || !change_range.0.is_finite() || !change_range.1.is_finite() {
            return Err(PortfolioError::invalid_range(format!(
                "volatility change range {change_range:?} with {num_points} points"
            )));
        }

        let changes = linspace(change_range.0, change_range.1, num_points);
        let min_volatility = self.analysis.min_volatility;

        let aggregates = self.evaluate_axis("volatility", changes.len(), |i, p| LegPoint {
            spot,
            time_to_expiry: p.time_to_maturity(valuation_date),
            volatility: (p.volatility() * (1.0 + changes[i])).max(min_volatility),
        })?;

        Ok(changes
            .into_iter()
            .zip(aggregates)
            .map(|(change, aggregate)| VolShiftPoint {
                change_percent: change * 100.0,
                aggregate,
            })
            .collect())
    }

    fn spot_axis(&self, sweep: &SpotSweep) -> Result<Vec<f64>, PortfolioError> {
        let num_points = sweep.num_points.unwrap_or(self.analysis.num_points);
        let mode = sweep.range_mode.unwrap_or(self.analysis.range_mode);
        let (default_min, default_max) = self.smart_price_range(mode);

        let mut spot_min = sweep.spot_min.unwrap_or(default_min);
        let spot_max = sweep.spot_max.unwrap_or(default_max);
        if sweep.use_log_scale {
            spot_min = spot_min.max(MIN_AXIS_SPOT);
        }
        validate_axis(spot_min, spot_max, num_points, f64::MIN_POSITIVE)?;

        Ok(if sweep.use_log_scale {
            logspace(spot_min, spot_max, num_points)
        } else {
            linspace(spot_min, spot_max, num_points)
        })
    }

    /// Evaluate every leg over `n` axis points and sum per point.
    fn evaluate_axis<F>(
        &self,
        axis: &'static str,
        n: usize,
        point: F,
    ) -> Result<Vec<PortfolioAggregate>, PortfolioError>
    where
        F: Fn(usize, &Position) -> LegPoint,
    {
        debug!(
            axis,
            points = n,
            legs = self.positions.len(),
            parallel = n >= self.calculator.parallel_threshold(),
            "Evaluating sweep"
        );

        let mut totals = vec![PortfolioAggregate::ZERO; n];
        for position in &self.positions {
            let mut spots = Vec::with_capacity(n);
            let mut times = Vec::with_capacity(n);
            let mut vols = Vec::with_capacity(n);
            for i in 0..n {
                let LegPoint {
                    spot,
                    time_to_expiry,
                    volatility,
                } = point(i, position);
                spots.push(spot);
                times.push(time_to_expiry);
                vols.push(volatility);
            }

            let greeks = self.calculator.calculate_batch(
                &spots,
                &vec![position.strike(); n],
                &times,
                &vols,
                position.kind(),
            )?;

            for (total, leg) in totals.iter_mut().zip(&greeks) {
                *total += PortfolioAggregate::from_leg(leg, position.quantity());
            }
        }

        Ok(totals)
    }
}

/// Bounds must be finite with `lower >= floor` and `upper >= lower`, and
/// there must be at least one point.
fn validate_axis(lower: f64, upper: f64, num_points: usize, floor: f64) -> Result<(), PortfolioError> {
    if num_points == 0 {
        return Err(PortfolioError::invalid_range("axis needs at least one point"));
    }
    if !lower.is_finite() || !upper.is_finite() || lower < floor || upper < lower {
        return Err(PortfolioError::invalid_range(format!(
            "axis [{lower}, {upper}] must be finite, ordered and at least {floor}"
        )));
    }
    Ok(())
}
