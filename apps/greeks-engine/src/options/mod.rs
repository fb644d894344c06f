//! Option Contracts and Positions
//!
//! Value objects describing what a portfolio holds:
//! - `OptionSpec`: strike, kind and expiration of one contract
//! - `Position`: a signed quantity of one contract with its volatility and fill
//! - `Instrument`: venue instrument names such as `ETH-30NOV25-2600-C`

mod contract;
mod error;
mod instrument;
mod position;

pub use contract::OptionSpec;
pub use error::OptionsError;
pub use instrument::Instrument;
pub use position::{DEFAULT_VOLATILITY, Position};
