//! Pricing error types.

use thiserror::Error;

/// Errors raised at the pricing API boundary.
///
/// Degenerate time or volatility never surfaces here; the kernel floors
/// both and switches to the intrinsic branch near expiry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PricingError {
    /// Invalid input parameters (non-positive spot or strike, non-finite values).
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Error message.
        message: String,
    },

    /// Batched inputs of unequal length.
    #[error("Batch length mismatch for {field}: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Name of the offending input slice.
        field: &'static str,
        /// Length of the spot slice.
        expected: usize,
        /// Length of the offending slice.
        actual: usize,
    },

    /// Unrecognised option kind identifier.
    #[error("Invalid option kind '{value}': expected one of C, call, P, put")]
    InvalidOptionKind {
        /// The identifier that failed to parse.
        value: String,
    },
}

/// Validate the market inputs of a single option evaluation.
pub(crate) fn validate_inputs(
    spot: f64,
    strike: f64,
    time_to_expiry: f64,
    volatility: f64,
) -> Result<(), PricingError> {
    if !spot.is_finite() || spot <= 0.0 {
        return Err(PricingError::InvalidInput {
            message: format!("Spot price must be positive, got: {spot}"),
        });
    }
    if !strike.is_finite() || strike <= 0.0 {
        return Err(PricingError::InvalidInput {
            message: format!("Strike price must be positive, got: {strike}"),
        });
    }
    if !time_to_expiry.is_finite() {
        return Err(PricingError::InvalidInput {
            message: format!("Time to expiration must be finite, got: {time_to_expiry}"),
        });
    }
    if !volatility.is_finite() {
        return Err(PricingError::InvalidInput {
            message: format!("Volatility must be finite, got: {volatility}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_spot_and_strike() {
        assert!(validate_inputs(0.0, 100.0, 1.0, 0.2).is_err());
        assert!(validate_inputs(100.0, -5.0, 1.0, 0.2).is_err());
        assert!(validate_inputs(f64::NAN, 100.0, 1.0, 0.2).is_err());
    }

    #[test]
    fn accepts_degenerate_time_and_volatility() {
        // Flooring handles these downstream
        assert!(validate_inputs(100.0, 100.0, 0.0, 0.0).is_ok());
        assert!(validate_inputs(100.0, 100.0, -1.0, -0.5).is_ok());
    }

    #[test]
    fn error_display() {
        let err = PricingError::InvalidOptionKind {
            value: "X".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid option kind 'X': expected one of C, call, P, put"
        );
    }
}
