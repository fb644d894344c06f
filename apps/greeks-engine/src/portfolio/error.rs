//! Portfolio error types.

use thiserror::Error;

use crate::options::OptionsError;
use crate::pricing::PricingError;

/// Errors from portfolio aggregation, sweeps and template loading.
///
/// An empty portfolio is never an error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PortfolioError {
    /// Strategy template name not recognised.
    #[error("Unknown strategy '{name}'. Valid strategies: {valid}")]
    UnknownStrategy {
        /// The name that was requested.
        name: String,
        /// Comma-separated list of valid template names.
        valid: String,
    },

    /// Sweep axis or point count out of range.
    #[error("Invalid range: {message}")]
    InvalidRange {
        /// Error message.
        message: String,
    },

    /// Pricing error.
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// Contract error.
    #[error("Contract error: {0}")]
    Options(#[from] OptionsError),
}

impl PortfolioError {
    pub(crate) fn invalid_range(message: impl Into<String>) -> Self {
        Self::InvalidRange {
            message: message.into(),
        }
    }
}
