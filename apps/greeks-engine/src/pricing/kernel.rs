//! Black-Scholes-Merton pricing kernel.
//!
//! Computes the standardized auxiliary terms d1 and d2 shared by every
//! price and Greek. Time and volatility are floored at [`EPSILON`] before
//! any division so degenerate inputs never produce NaN or infinity.

use std::f64::consts::{PI, SQRT_2};

use super::error::PricingError;

/// Floor applied to time to expiry (years) and volatility.
pub const EPSILON: f64 = 1e-10;

/// Standard normal CDF (cumulative distribution function).
#[must_use]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + libm::erf(x / SQRT_2))
}

/// Standard normal PDF (probability density function).
#[must_use]
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// The pair of auxiliary terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct D1D2 {
    /// d1 = [ln(S/K) + (r + σ²/2)T] / (σ√T).
    pub d1: f64,
    /// d2 = d1 − σ√T.
    pub d2: f64,
}

/// Compute d1 and d2 for one option.
#[must_use]
pub fn d1d2(s: f64, k: f64, t: f64, sigma: f64, r: f64) -> D1D2 {
    let t = t.max(EPSILON);
    let sigma = sigma.max(EPSILON);
    let vol_sqrt_t = sigma * t.sqrt();

    let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / vol_sqrt_t;

    D1D2 {
        d1,
        d2: d1 - vol_sqrt_t,
    }
}

/// Element-wise d1 and d2 over equally sized slices.
pub fn d1d2_batch(
    s: &[f64],
    k: &[f64],
    t: &[f64],
    sigma: &[f64],
    r: f64,
) -> Result<Vec<D1D2>, PricingError> {
    ensure_len("strike", s.len(), k.len())?;
    ensure_len("time_to_expiry", s.len(), t.len())?;
    ensure_len("volatility", s.len(), sigma.len())?;

    Ok(s.iter()
        .zip(k)
        .zip(t)
        .zip(sigma)
        .map(|(((&s, &k), &t), &sigma)| d1d2(s, k, t, sigma, r))
        .collect())
}

pub(crate) const fn ensure_len(
    field: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), PricingError> {
    if expected == actual {
        Ok(())
    } else {
        Err(PricingError::LengthMismatch {
            field,
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    #[test]
    fn test_norm_cdf() {
        assert!(approx_eq(norm_cdf(0.0), 0.5, 1e-12));
        assert!(approx_eq(norm_cdf(1.96), 0.975, 0.001));
        assert!(approx_eq(norm_cdf(-1.96), 0.025, 0.001));
    }

    #[test]
    fn test_norm_pdf() {
        assert!(approx_eq(norm_pdf(0.0), 0.398_942_280_4, 1e-9));
        assert!(approx_eq(norm_pdf(1.0), norm_pdf(-1.0), 1e-15));
    }

    #[test]
    fn test_d1d2_atm_reference() {
        // S=K=3000, T=30/365, sigma=100%, r=5%
        let terms = d1d2(3000.0, 3000.0, 30.0 / 365.0, 1.0, 0.05);
        assert!(approx_eq(terms.d1, 0.157_680_099, 1e-8));
        assert!(approx_eq(terms.d2, -0.129_010_990, 1e-8));
    }

    #[test]
    fn test_d1d2_floors_degenerate_inputs() {
        let terms = d1d2(100.0, 90.0, 0.0, 0.0, 0.05);
        assert!(terms.d1.is_finite());
        assert!(terms.d2.is_finite());

        let terms = d1d2(100.0, 100.0, -1.0, -1.0, 0.0);
        assert!(!terms.d1.is_nan());
    }

    #[test]
    fn test_batch_matches_scalar() {
        let s = [2500.0, 3000.0, 3500.0];
        let k = [3000.0; 3];
        let t = [0.1, 0.2, 0.3];
        let sigma = [0.5, 0.8, 1.2];

        let batch = d1d2_batch(&s, &k, &t, &sigma, 0.05).unwrap();
        for (i, terms) in batch.iter().enumerate() {
            assert_eq!(*terms, d1d2(s[i], k[i], t[i], sigma[i], 0.05));
        }
    }

    #[test]
    fn test_batch_length_mismatch() {
        let err = d1d2_batch(&[1.0, 2.0], &[1.0], &[1.0, 1.0], &[1.0, 1.0], 0.0).unwrap_err();
        assert_eq!(
            err,
            PricingError::LengthMismatch {
                field: "strike",
                expected: 2,
                actual: 1,
            }
        );
    }
}
