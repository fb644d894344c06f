//! Option contract error types.

use thiserror::Error;

/// Errors from contract construction and instrument parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OptionsError {
    /// Contract fields out of range.
    #[error("Invalid contract: {message}")]
    InvalidContract {
        /// Error message.
        message: String,
    },

    /// Instrument name not in `UNDERLYING-DDMMMYY-STRIKE-KIND` form.
    #[error("Invalid instrument '{name}': {reason}")]
    InvalidInstrument {
        /// The instrument name that failed to parse.
        name: String,
        /// What was wrong with it.
        reason: String,
    },
}
