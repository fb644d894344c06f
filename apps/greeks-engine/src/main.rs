//! Greeks Engine Binary
//!
//! Loads a strategy template around a spot price and prints a JSON risk
//! report to stdout.
//!
//! # Usage
//!
//! ```bash
//! STRATEGY=iron_condor SPOT=3150 cargo run --bin greeks-engine
//! ```
//!
//! # Environment Variables
//!
//! - `GREEKS_CONFIG`: Config file path (default: greeks.yaml if present)
//! - `STRATEGY`: Template name (default: long_straddle)
//! - `SPOT`: Underlying spot price (default: 3000)
//! - `POINTS`: Sweep length (default: from config)
//! - `RUST_LOG`: Log level override

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use greeks_engine::config::{self, Config, DEFAULT_CONFIG_PATH};
use greeks_engine::portfolio::{MarketState, PortfolioAggregator, SpotSweep};
use greeks_engine::telemetry;
use serde_json::json;
use tracing::info;

/// Default template.
const DEFAULT_STRATEGY: &str = "long_straddle";

/// Default spot price.
const DEFAULT_SPOT: f64 = 3000.0;

fn main() -> Result<()> {
    let config = read_config()?;
    telemetry::init_logging(&config.observability.logging)
        .context("failed to install tracing subscriber")?;

    let strategy = std::env::var("STRATEGY").unwrap_or_else(|_| DEFAULT_STRATEGY.to_string());
    let spot: f64 = match std::env::var("SPOT") {
        Ok(raw) => raw.parse().with_context(|| format!("SPOT is not a number: {raw}"))?,
        Err(_) => DEFAULT_SPOT,
    };
    let num_points: Option<usize> = match std::env::var("POINTS") {
        Ok(raw) => Some(raw.parse().with_context(|| format!("POINTS is not a count: {raw}"))?),
        Err(_) => None,
    };

    let today = Utc::now().date_naive();
    let market = MarketState::new(spot, today)?.with_risk_free_rate(config.pricing.risk_free_rate)?;
    let mut portfolio = PortfolioAggregator::with_config(market, &config);
    portfolio.load_strategy_template(&strategy, None)?;

    info!(
        strategy = %strategy,
        spot,
        legs = portfolio.len(),
        "Building risk report"
    );

    let sweep = SpotSweep {
        num_points,
        ..SpotSweep::default()
    };
    let report = json!({
        "strategy": strategy,
        "valuation_date": today,
        "summary": portfolio.summary(),
        "positions": portfolio.position_rows(None),
        "greeks": portfolio.aggregate_greeks(None, None, 1.0, 0)?,
        "cost_basis": portfolio.cost_basis_detail(None)?,
        "max_loss_at_expiration": portfolio.max_loss_at_expiration(None, None, None, None)?,
        "pnl": portfolio.pnl_vs_spot(&sweep)?,
    });

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// `GREEKS_CONFIG` if set, else the default path if it exists, else defaults.
fn read_config() -> Result<Config> {
    let config = match std::env::var("GREEKS_CONFIG") {
        Ok(path) => config::load_config(Some(&path))?,
        Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => config::load_config(None)?,
        Err(_) => Config::default(),
    };
    Ok(config)
}
