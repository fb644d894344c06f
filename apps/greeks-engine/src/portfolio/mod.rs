//! Portfolio Aggregation
//!
//! Linear aggregation of option legs and the scenario analysis built on it:
//! - `analyzer`: the `PortfolioAggregator`, cost basis and per-leg views
//! - `sweeps`: spot, PnL, expiration, time-decay and volatility sweeps
//! - `templates`: named multi-leg strategies on an ATM strike grid
//! - `range`: default spot axis heuristics
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use greeks_engine::portfolio::{MarketState, PortfolioAggregator};
//!
//! let today = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();
//! let mut portfolio = PortfolioAggregator::new(MarketState::new(3000.0, today)?);
//! portfolio.load_strategy_template("long_straddle", None)?;
//!
//! let greeks = portfolio.aggregate_greeks(None, None, 1.0, 0)?;
//! assert!(greeks.gamma > 0.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod aggregate;
mod analyzer;
mod error;
mod market;
mod range;
mod summary;
mod sweeps;
mod templates;

pub use aggregate::PortfolioAggregate;
pub use analyzer::PortfolioAggregator;
pub use error::PortfolioError;
pub use market::{DEFAULT_RISK_FREE_RATE, MarketState};
pub use range::{MIN_AXIS_SPOT, RangeMode, price_range};
pub use summary::{CostBasis, PortfolioSummary, PositionGreeks, PositionRow};
pub use sweeps::{DecayPoint, PnlPoint, PnlSeries, SpotPoint, SpotSeries, SpotSweep, VolShiftPoint};
pub use templates::{StrategyTemplate, TemplateLeg, Tenor, atm_strike};
