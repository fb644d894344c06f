//! Portfolio Aggregator
//!
//! Owns an ordered list of option legs and evaluates them together at a
//! market state. Every aggregate is the quantity-weighted sum of per-leg
//! Greeks, so the result for a union of disjoint leg sets equals the sum
//! of the results for each set.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{info, warn};

use super::aggregate::PortfolioAggregate;
use super::error::PortfolioError;
use super::market::{MarketState, validate_spot};
use super::summary::{CostBasis, PortfolioSummary, PositionGreeks, PositionRow};
use crate::config::{AnalysisConfig, Config, PricingConfig, StrategyConfig};
use crate::options::Position;
use crate::pricing::{GreeksCalculator, GreeksResult, OptionInputs, PricingError};

/// Multi-leg options portfolio evaluated under Black-Scholes-Merton.
///
/// Mutation takes `&mut self`; share behind a lock or snapshot the
/// positions before a batch of concurrent reads.
#[derive(Debug, Clone)]
pub struct PortfolioAggregator {
    pub(super) calculator: GreeksCalculator,
    pub(super) pricing: PricingConfig,
    pub(super) analysis: AnalysisConfig,
    pub(super) strategy: StrategyConfig,
    pub(super) market: MarketState,
    pub(super) positions: Vec<Position>,
}

impl PortfolioAggregator {
    /// Create an empty portfolio with default configuration.
    #[must_use]
    pub fn new(market: MarketState) -> Self {
        Self::with_config(market, &Config::default())
    }

    /// Create an empty portfolio.
    ///
    /// The market's risk-free rate takes precedence over the configured one.
    #[must_use]
    pub fn with_config(market: MarketState, config: &Config) -> Self {
        Self {
            calculator: build_calculator(&config.pricing, &config.analysis, &market),
            pricing: config.pricing,
            analysis: config.analysis,
            strategy: config.strategy,
            market,
            positions: Vec::new(),
        }
    }

    /// Get the market state.
    #[must_use]
    pub const fn market(&self) -> &MarketState {
        &self.market
    }

    /// Replace the market state.
    pub fn set_market(&mut self, market: MarketState) {
        self.calculator = build_calculator(&self.pricing, &self.analysis, &market);
        self.market = market;
    }

    /// Get the calculator legs are priced with.
    #[must_use]
    pub const fn calculator(&self) -> &GreeksCalculator {
        &self.calculator
    }

    /// Get the legs in insertion order.
    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Number of legs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if the portfolio holds no legs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    // ========================================================================
    // Position management
    // ========================================================================

    /// Append a leg. Duplicates are kept.
    pub fn add_position(&mut self, position: Position) {
        self.positions.push(position);
    }

    /// Remove the leg at `index`, returning it. Out-of-range indices are ignored.
    pub fn remove_position(&mut self, index: usize) -> Option<Position> {
        (index < self.positions.len()).then(|| self.positions.remove(index))
    }

    /// Remove every leg.
    pub fn clear_positions(&mut self) {
        if !self.positions.is_empty() {
            info!(removed = self.positions.len(), "Portfolio cleared");
        }
        self.positions.clear();
    }

    // ========================================================================
    // Aggregation
    // ========================================================================

    /// Aggregate Greeks and value.
    ///
    /// Each leg is priced with T measured from `valuation_date` plus
    /// `time_offset_days` and with its volatility scaled by
    /// `vol_multiplier`. Legs inside the expiry threshold are valued at
    /// intrinsic. Missing spot and date default to the market state.
    pub fn aggregate_greeks(
        &self,
        spot: Option<f64>,
        valuation_date: Option<NaiveDate>,
        vol_multiplier: f64,
        time_offset_days: i64,
    ) -> Result<PortfolioAggregate, PortfolioError> {
        let spot = self.resolve_spot(spot)?;
        let valuation_date = valuation_date.unwrap_or_else(|| self.market.valuation_date());

        self.aggregate_at(spot, valuation_date, time_offset_days as f64, |p| {
            p.volatility() * vol_multiplier
        })
    }

    /// Σ entry price × quantity.
    ///
    /// Legs without a recorded fill are priced at `reference_spot` with
    /// their un-offset time to maturity, or at intrinsic once expired.
    pub fn cost_basis(&self, reference_spot: Option<f64>) -> Result<f64, PortfolioError> {
        self.cost_basis_detail(reference_spot).map(|basis| basis.value)
    }

    /// Cost basis with a count of the legs whose entry price was estimated.
    pub fn cost_basis_detail(&self, reference_spot: Option<f64>) -> Result<CostBasis, PortfolioError> {
        let spot = self.resolve_spot(reference_spot)?;
        let valuation_date = self.market.valuation_date();

        let mut basis = CostBasis::default();
        for position in &self.positions {
            let entry_price = match position.entry_price() {
                Some(price) => price,
                None => {
                    basis.estimated_legs += 1;
                    self.estimated_entry_price(position, spot, valuation_date)?
                }
            };
            basis.value += entry_price * position.quantity();
        }
        basis.is_estimated = basis.estimated_legs > 0;

        if basis.is_estimated {
            warn!(
                estimated_legs = basis.estimated_legs,
                total_legs = self.positions.len(),
                reference_spot = spot,
                "Cost basis uses model prices for legs without a recorded fill"
            );
        }

        Ok(basis)
    }

    /// One leg's quantity-weighted Greeks after `elapsed_days`.
    ///
    /// The leg need not belong to this portfolio.
    pub fn position_greeks(
        &self,
        position: &Position,
        spot: Option<f64>,
        elapsed_days: f64,
        valuation_date: Option<NaiveDate>,
        vol_multiplier: f64,
    ) -> Result<PositionGreeks, PortfolioError> {
        let spot = self.resolve_spot(spot)?;
        let valuation_date = valuation_date.unwrap_or_else(|| self.market.valuation_date());

        let t = position.time_to_maturity_after(valuation_date, elapsed_days);
        let greeks = self.leg_greeks(position, spot, t, position.volatility() * vol_multiplier)?;

        let remaining_days = if self.calculator.is_near_expiry(t) {
            0
        } else {
            let days = (position.expiration() - valuation_date).num_days() as f64;
            (days - elapsed_days).max(0.0).floor() as i64
        };

        Ok(PositionGreeks {
            aggregate: PortfolioAggregate::from_leg(&greeks, position.quantity()),
            remaining_days,
        })
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Positions table. `valuation_date` defaults to the market's.
    #[must_use]
    pub fn position_rows(&self, valuation_date: Option<NaiveDate>) -> Vec<PositionRow> {
        let valuation_date = valuation_date.unwrap_or_else(|| self.market.valuation_date());
        self.positions
            .iter()
            .enumerate()
            .map(|(index, p)| PositionRow {
                index,
                expiration: p.expiration(),
                strike: p.strike(),
                kind: p.kind(),
                quantity: p.quantity(),
                volatility: p.volatility(),
                entry_price: p.entry_price(),
                days_to_expiry: p.days_to_expiry(valuation_date),
            })
            .collect()
    }

    /// Leg counts, distinct strikes and expirations, net quantity.
    #[must_use]
    pub fn summary(&self) -> PortfolioSummary {
        let strikes: HashSet<u64> = self.positions.iter().map(|p| p.strike().to_bits()).collect();
        let expirations: HashSet<NaiveDate> = self.positions.iter().map(Position::expiration).collect();

        PortfolioSummary {
            total_positions: self.positions.len(),
            long_positions: self.positions.iter().filter(|p| p.is_long()).count(),
            short_positions: self.positions.iter().filter(|p| p.is_short()).count(),
            unique_strikes: strikes.len(),
            unique_expirations: expirations.len(),
            net_quantity: self.positions.iter().map(Position::quantity).sum(),
        }
    }

    /// Strikes of every leg, in order.
    #[must_use]
    pub fn strikes(&self) -> Vec<f64> {
        self.positions.iter().map(Position::strike).collect()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    pub(super) fn resolve_spot(&self, spot: Option<f64>) -> Result<f64, PortfolioError> {
        let spot = spot.unwrap_or_else(|| self.market.spot_price());
        validate_spot(spot)?;
        Ok(spot)
    }

    /// Aggregate with each leg's T shifted by `elapsed_days` and its
    /// volatility given by `volatility`.
    pub(super) fn aggregate_at<F>(
        &self,
        spot: f64,
        valuation_date: NaiveDate,
        elapsed_days: f64,
        volatility: F,
    ) -> Result<PortfolioAggregate, PortfolioError>
    where
        F: Fn(&Position) -> f64,
    {
        self.positions
            .iter()
            .map(|p| -> Result<PortfolioAggregate, PortfolioError> {
                let t = p.time_to_maturity_after(valuation_date, elapsed_days);
                let greeks = self.leg_greeks(p, spot, t, volatility(p))?;
                Ok(PortfolioAggregate::from_leg(&greeks, p.quantity()))
            })
            .sum()
    }

    pub(super) fn leg_greeks(
        &self,
        position: &Position,
        spot: f64,
        time_to_expiry: f64,
        volatility: f64,
    ) -> Result<GreeksResult, PricingError> {
        let inputs = OptionInputs::new(
            spot,
            position.strike(),
            time_to_expiry,
            volatility,
            position.kind(),
        )?;
        Ok(self.calculator.calculate_all_greeks(&inputs))
    }

    pub(super) fn estimated_entry_price(
        &self,
        position: &Position,
        spot: f64,
        valuation_date: NaiveDate,
    ) -> Result<f64, PricingError> {
        let t = position.time_to_maturity(valuation_date);
        if t > 0.0 {
            Ok(self.leg_greeks(position, spot, t, position.volatility())?.price)
        } else {
            Ok(position.spec().intrinsic_value(spot))
        }
    }
}

fn build_calculator(
    pricing: &PricingConfig,
    analysis: &AnalysisConfig,
    market: &MarketState,
) -> GreeksCalculator {
    GreeksCalculator::new(&PricingConfig {
        risk_free_rate: market.risk_free_rate(),
        ..*pricing
    })
    .with_parallel_threshold(analysis.parallel_threshold)
}
