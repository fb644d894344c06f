// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_collect,
        clippy::items_after_statements
    )
)]

//! Greeks Engine - Options Risk Core
//!
//! Black-Scholes-Merton pricing and multi-leg portfolio risk for European
//! options.
//!
//! # Modules
//!
//! - `pricing`: d1/d2 kernel, `GreeksCalculator` (scalar and batched),
//!   single-option scenario sweeps
//! - `options`: contract specs, instrument names, positions
//! - `portfolio`: `PortfolioAggregator`, cost basis, max loss, portfolio
//!   sweeps, strategy templates
//! - `config`: YAML configuration with `${VAR:-default}` interpolation
//! - `telemetry`: tracing subscriber setup
//!
//! Batched evaluation switches to rayon above a configurable size and
//! returns results in input order, identical to the scalar path.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Configuration loading and validation.
pub mod config;

/// Option contracts and positions.
pub mod options;

/// Portfolio aggregation and scenario analysis.
pub mod portfolio;

/// Black-Scholes pricing and Greeks.
pub mod pricing;

/// Logging setup.
pub mod telemetry;

pub use config::{Config, ConfigError, load_config};
pub use options::{Instrument, OptionSpec, OptionsError, Position};
pub use portfolio::{
    MarketState, PortfolioAggregate, PortfolioAggregator, PortfolioError, RangeMode, SpotSweep,
    StrategyTemplate,
};
pub use pricing::{GreeksCalculator, GreeksResult, OptionInputs, OptionKind, PricingError};
