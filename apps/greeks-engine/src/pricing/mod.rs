//! Options Pricing
//!
//! Black-Scholes-Merton pricing for European options:
//! - `kernel`: d1/d2 auxiliary terms and the normal distribution
//! - `greeks`: price plus first- and second-order Greeks, scalar or batched
//! - `scenario`: spot, time-decay and volatility sweeps for one option
//!
//! # Example
//!
//! ```rust
//! use greeks_engine::pricing::{GreeksCalculator, OptionInputs, OptionKind};
//!
//! let calc = GreeksCalculator::with_rate(0.05);
//! let inputs = OptionInputs::new(3000.0, 3000.0, 30.0 / 365.0, 1.0, OptionKind::Call)?;
//! let greeks = calc.calculate_all_greeks(&inputs);
//! assert!(greeks.gamma > 0.0);
//! # Ok::<(), greeks_engine::pricing::PricingError>(())
//! ```

mod error;
mod greeks;
mod kernel;
mod kind;
mod scenario;

pub use error::PricingError;
pub use greeks::{
    DAYS_PER_YEAR, DEFAULT_PARALLEL_THRESHOLD, GreeksCalculator, GreeksResult, OptionInputs,
};
pub use kernel::{D1D2, EPSILON, d1d2, d1d2_batch, norm_cdf, norm_pdf};
pub use kind::OptionKind;
pub use scenario::{
    MIN_SCENARIO_VOLATILITY, PriceScenario, ScenarioPoint, TIME_DECAY_FLOOR, TimeDecayPoint,
    TimeHorizon, VolatilityPoint, VolatilityScenario, linspace, logspace,
};
