//! Greeks Calculator
//!
//! Prices one European option and its sensitivities under
//! Black-Scholes-Merton:
//! - First order: delta, theta, vega, rho
//! - Second order: gamma, vanna, volga (vomma)
//!
//! Every operation shares one d1/d2 evaluation when bundled through
//! [`GreeksCalculator::calculate_all_greeks`] or the batched path.
//!
//! Inside the expiry threshold (T at or below ~0.001y, about 8.76h) the
//! model switches to the intrinsic-value branch: price is the payoff,
//! delta snaps to {-1, 0, 1} and every other Greek is exactly zero.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

use crate::config::PricingConfig;

use super::error::{PricingError, validate_inputs};
use super::kernel::{D1D2, EPSILON, d1d2, d1d2_batch, ensure_len, norm_cdf, norm_pdf};
use super::kind::OptionKind;

/// Calendar days per year used for T and theta_daily.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Default point count above which batches are evaluated in parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;

// ============================================================================
// Inputs
// ============================================================================

/// Validated inputs for a single option evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionInputs {
    /// Underlying spot price.
    pub spot: f64,
    /// Strike price.
    pub strike: f64,
    /// Time to expiration (years).
    pub time_to_expiry: f64,
    /// Volatility as a decimal (1.0 = 100%).
    pub volatility: f64,
    /// Call or put.
    pub kind: OptionKind,
}

impl OptionInputs {
    /// Create validated inputs.
    ///
    /// Fails fast on non-positive spot or strike and on non-finite values.
    /// Time and volatility may be zero or negative; the kernel floors them.
    pub fn new(
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        volatility: f64,
        kind: OptionKind,
    ) -> Result<Self, PricingError> {
        validate_inputs(spot, strike, time_to_expiry, volatility)?;
        Ok(Self {
            spot,
            strike,
            time_to_expiry,
            volatility,
            kind,
        })
    }
}

// ============================================================================
// Result
// ============================================================================

/// Price and Greeks of one option, per unit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GreeksResult {
    /// Theoretical price.
    pub price: f64,
    /// ∂price/∂S. Call in [0, 1], put in [-1, 0].
    pub delta: f64,
    /// ∂²price/∂S². Identical for calls and puts.
    pub gamma: f64,
    /// ∂price/∂t, annualized.
    pub theta: f64,
    /// Theta per calendar day (theta / 365).
    pub theta_daily: f64,
    /// ∂price/∂σ per unit of volatility (1.0 = 100%).
    pub vega: f64,
    /// Vega per 1% volatility move (vega / 100).
    pub vega_percent: f64,
    /// ∂price/∂r.
    pub rho: f64,
    /// ∂vega/∂S = ∂delta/∂σ.
    pub vanna: f64,
    /// ∂vega/∂σ (vomma).
    pub volga: f64,
}

impl GreeksResult {
    /// Zero result.
    pub const ZERO: Self = Self {
        price: 0.0,
        delta: 0.0,
        gamma: 0.0,
        theta: 0.0,
        theta_daily: 0.0,
        vega: 0.0,
        vega_percent: 0.0,
        rho: 0.0,
        vanna: 0.0,
        volga: 0.0,
    };

    /// Intrinsic-value branch used at and inside the expiry threshold.
    #[must_use]
    pub fn intrinsic(spot: f64, strike: f64, kind: OptionKind) -> Self {
        Self {
            price: kind.intrinsic_value(spot, strike),
            delta: kind.expiry_delta(spot, strike),
            ..Self::ZERO
        }
    }

    /// Scale by a signed quantity (positive for long, negative for short).
    #[must_use]
    pub fn scale(&self, quantity: f64) -> Self {
        Self {
            price: self.price * quantity,
            delta: self.delta * quantity,
            gamma: self.gamma * quantity,
            theta: self.theta * quantity,
            theta_daily: self.theta_daily * quantity,
            vega: self.vega * quantity,
            vega_percent: self.vega_percent * quantity,
            rho: self.rho * quantity,
            vanna: self.vanna * quantity,
            volga: self.volga * quantity,
        }
    }
}

impl Add for GreeksResult {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            price: self.price + rhs.price,
            delta: self.delta + rhs.delta,
            gamma: self.gamma + rhs.gamma,
            theta: self.theta + rhs.theta,
            theta_daily: self.theta_daily + rhs.theta_daily,
            vega: self.vega + rhs.vega,
            vega_percent: self.vega_percent + rhs.vega_percent,
            rho: self.rho + rhs.rho,
            vanna: self.vanna + rhs.vanna,
            volga: self.volga + rhs.volga,
        }
    }
}

impl AddAssign for GreeksResult {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

// ============================================================================
// Calculator
// ============================================================================

/// Black-Scholes-Merton Greeks calculator.
///
/// The risk-free rate is carried by each instance rather than read from
/// shared state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreeksCalculator {
    risk_free_rate: f64,
    expiry_threshold: f64,
    parallel_threshold: usize,
}

impl Default for GreeksCalculator {
    fn default() -> Self {
        Self::new(&PricingConfig::default())
    }
}

impl GreeksCalculator {
    /// Create a new calculator with the given configuration.
    #[must_use]
    pub const fn new(config: &PricingConfig) -> Self {
        Self {
            risk_free_rate: config.risk_free_rate,
            expiry_threshold: config.expiry_threshold_years,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// Create a calculator at a specific rate with default thresholds.
    #[must_use]
    pub fn with_rate(risk_free_rate: f64) -> Self {
        Self::new(&PricingConfig {
            risk_free_rate,
            ..PricingConfig::default()
        })
    }

    /// Set the batch size at which evaluation moves onto the rayon pool.
    #[must_use]
    pub const fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Annualized risk-free rate.
    #[must_use]
    pub const fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// Time to expiry (years) at or below which the intrinsic branch applies.
    #[must_use]
    pub const fn expiry_threshold(&self) -> f64 {
        self.expiry_threshold
    }

    /// Batch size at which evaluation runs in parallel.
    #[must_use]
    pub const fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Check whether a time to expiry falls in the intrinsic branch.
    #[must_use]
    pub fn is_near_expiry(&self, time_to_expiry: f64) -> bool {
        time_to_expiry <= self.expiry_threshold
    }

    /// d1 and d2 for these inputs at this calculator's rate.
    #[must_use]
    pub fn d1d2(&self, inputs: &OptionInputs) -> D1D2 {
        d1d2(
            inputs.spot,
            inputs.strike,
            inputs.time_to_expiry,
            inputs.volatility,
            self.risk_free_rate,
        )
    }

    /// Theoretical price.
    #[must_use]
    pub fn price(&self, inputs: &OptionInputs) -> f64 {
        self.calculate_all_greeks(inputs).price
    }

    /// Delta.
    #[must_use]
    pub fn delta(&self, inputs: &OptionInputs) -> f64 {
        if self.is_near_expiry(inputs.time_to_expiry) {
            return inputs.kind.expiry_delta(inputs.spot, inputs.strike);
        }
        let D1D2 { d1, .. } = self.d1d2(inputs);
        match inputs.kind {
            OptionKind::Call => norm_cdf(d1),
            OptionKind::Put => norm_cdf(d1) - 1.0,
        }
    }

    /// Gamma.
    #[must_use]
    pub fn gamma(&self, inputs: &OptionInputs) -> f64 {
        self.calculate_all_greeks(inputs).gamma
    }

    /// Theta (annualized).
    #[must_use]
    pub fn theta(&self, inputs: &OptionInputs) -> f64 {
        self.calculate_all_greeks(inputs).theta
    }

    /// Vega per unit of volatility.
    #[must_use]
    pub fn vega(&self, inputs: &OptionInputs) -> f64 {
        self.calculate_all_greeks(inputs).vega
    }

    /// Rho.
    #[must_use]
    pub fn rho(&self, inputs: &OptionInputs) -> f64 {
        self.calculate_all_greeks(inputs).rho
    }

    /// Vanna.
    #[must_use]
    pub fn vanna(&self, inputs: &OptionInputs) -> f64 {
        self.calculate_all_greeks(inputs).vanna
    }

    /// Volga (vomma).
    #[must_use]
    pub fn volga(&self, inputs: &OptionInputs) -> f64 {
        self.calculate_all_greeks(inputs).volga
    }

    /// Price and every Greek from a single d1/d2 evaluation.
    #[must_use]
    pub fn calculate_all_greeks(&self, inputs: &OptionInputs) -> GreeksResult {
        if self.is_near_expiry(inputs.time_to_expiry) {
            return GreeksResult::intrinsic(inputs.spot, inputs.strike, inputs.kind);
        }
        let terms = self.d1d2(inputs);
        self.evaluate(inputs, terms)
    }

    /// Batched evaluation over equally sized slices of a single option kind.
    ///
    /// Element `i` of the output equals the scalar result for element `i`
    /// of the inputs. Large batches run on the rayon pool; order is kept.
    pub fn calculate_batch(
        &self,
        spots: &[f64],
        strikes: &[f64],
        times: &[f64],
        volatilities: &[f64],
        kind: OptionKind,
    ) -> Result<Vec<GreeksResult>, PricingError> {
        ensure_len("strike", spots.len(), strikes.len())?;
        ensure_len("time_to_expiry", spots.len(), times.len())?;
        ensure_len("volatility", spots.len(), volatilities.len())?;

        let inputs = spots
            .iter()
            .zip(strikes)
            .zip(times)
            .zip(volatilities)
            .map(|(((&s, &k), &t), &v)| OptionInputs::new(s, k, t, v, kind))
            .collect::<Result<Vec<_>, _>>()?;

        let terms = d1d2_batch(spots, strikes, times, volatilities, self.risk_free_rate)?;

        let evaluate = |(input, terms): (&OptionInputs, &D1D2)| {
            if self.is_near_expiry(input.time_to_expiry) {
                GreeksResult::intrinsic(input.spot, input.strike, input.kind)
            } else {
                self.evaluate(input, *terms)
            }
        };

        let results = if inputs.len() >= self.parallel_threshold {
            inputs.par_iter().zip(terms.par_iter()).map(evaluate).collect()
        } else {
            inputs.iter().zip(terms.iter()).map(evaluate).collect()
        };

        Ok(results)
    }

    /// Closed-form Greeks from precomputed d1/d2.
    fn evaluate(&self, inputs: &OptionInputs, terms: D1D2) -> GreeksResult {
        let OptionInputs {
            spot: s,
            strike: k,
            kind,
            ..
        } = *inputs;
        let D1D2 { d1, d2 } = terms;
        let t = inputs.time_to_expiry.max(EPSILON);
        let sigma = inputs.volatility.max(EPSILON);
        let r = self.risk_free_rate;

        let sqrt_t = t.sqrt();
        let discount = (-r * t).exp();
        let pdf_d1 = norm_pdf(d1);

        let gamma = pdf_d1 / (s * sigma * sqrt_t);
        let vega = s * sqrt_t * pdf_d1;
        let decay = -s * pdf_d1 * sigma / (2.0 * sqrt_t);

        let (price, delta, theta, rho) = match kind {
            OptionKind::Call => {
                let n_d1 = norm_cdf(d1);
                let n_d2 = norm_cdf(d2);
                (
                    s * n_d1 - k * discount * n_d2,
                    n_d1,
                    decay - r * k * discount * n_d2,
                    k * t * discount * n_d2,
                )
            }
            OptionKind::Put => {
                let n_neg_d1 = norm_cdf(-d1);
                let n_neg_d2 = norm_cdf(-d2);
                (
                    k * discount * n_neg_d2 - s * n_neg_d1,
                    norm_cdf(d1) - 1.0,
                    decay + r * k * discount * n_neg_d2,
                    -k * t * discount * n_neg_d2,
                )
            }
        };

        GreeksResult {
            price,
            delta,
            gamma,
            theta,
            theta_daily: theta / DAYS_PER_YEAR,
            vega,
            vega_percent: vega / 100.0,
            rho,
            vanna: -pdf_d1 * d2 / (s * sigma),
            volga: vega * d1 * d2 / sigma,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    fn inputs(s: f64, k: f64, t: f64, sigma: f64, kind: OptionKind) -> OptionInputs {
        match OptionInputs::new(s, k, t, sigma, kind) {
            Ok(i) => i,
            Err(e) => panic!("valid inputs rejected: {e}"),
        }
    }

    fn canonical(kind: OptionKind) -> GreeksResult {
        let calc = GreeksCalculator::with_rate(0.05);
        calc.calculate_all_greeks(&inputs(3000.0, 3000.0, 30.0 / 365.0, 1.0, kind))
    }

    #[test]
    fn test_canonical_call_fixture() {
        let g = canonical(OptionKind::Call);
        assert!(approx_eq(g.price, 347.4335, 1e-4));
        assert!(approx_eq(g.delta, 0.5626, 1e-4));
        assert!(approx_eq(g.gamma, 0.000_458_1, 1e-7));
        assert!(approx_eq(g.theta_daily, -5.8316, 1e-4));
        assert!(approx_eq(g.vega, 338.8805, 1e-4));
        assert!(approx_eq(g.rho, 110.1783, 1e-4));
    }

    #[test]
    fn test_canonical_put_fixture() {
        let g = canonical(OptionKind::Put);
        assert!(approx_eq(g.price, 335.1300, 1e-4));
        assert!(approx_eq(g.delta, -0.4374, 1e-4));
        assert!(approx_eq(g.theta_daily, -5.4224, 1e-4));
        assert!(approx_eq(g.rho, -135.3858, 1e-4));
    }

    #[test]
    fn test_second_order_reference() {
        let call = canonical(OptionKind::Call);
        let put = canonical(OptionKind::Put);
        assert!(approx_eq(call.vanna, 1.694_4e-5, 1e-8));
        assert!(approx_eq(call.volga, -6.8937, 1e-4));
        // Identical across kinds
        assert_eq!(call.gamma, put.gamma);
        assert_eq!(call.vega, put.vega);
        assert_eq!(call.vanna, put.vanna);
        assert_eq!(call.volga, put.volga);
    }

    #[test]
    fn test_convenience_fields() {
        let g = canonical(OptionKind::Call);
        assert!(approx_eq(g.theta_daily * 365.0, g.theta, 1e-9));
        assert!(approx_eq(g.vega_percent * 100.0, g.vega, 1e-9));
    }

    #[test]
    fn test_textbook_prices() {
        // S=100, K=100, T=1, r=5%, sigma=20%
        let calc = GreeksCalculator::with_rate(0.05);
        let call = calc.price(&inputs(100.0, 100.0, 1.0, 0.2, OptionKind::Call));
        let put = calc.price(&inputs(100.0, 100.0, 1.0, 0.2, OptionKind::Put));
        assert!(approx_eq(call, 10.4506, 1e-4));
        assert!(approx_eq(put, 5.5735, 1e-4));
    }

    #[test]
    fn test_put_call_parity() {
        let calc = GreeksCalculator::with_rate(0.03);
        let (s, k, t) = (2750.0, 3100.0, 0.4);
        let call = calc.price(&inputs(s, k, t, 0.85, OptionKind::Call));
        let put = calc.price(&inputs(s, k, t, 0.85, OptionKind::Put));
        let forward = s - k * (-0.03 * t).exp();
        assert!(approx_eq(call - put, forward, 1e-6));
    }

    #[test]
    fn test_single_greeks_match_bundle() {
        let calc = GreeksCalculator::with_rate(0.05);
        let i = inputs(2900.0, 3000.0, 0.2, 0.7, OptionKind::Put);
        let all = calc.calculate_all_greeks(&i);
        assert_eq!(calc.price(&i), all.price);
        assert_eq!(calc.delta(&i), all.delta);
        assert_eq!(calc.gamma(&i), all.gamma);
        assert_eq!(calc.theta(&i), all.theta);
        assert_eq!(calc.vega(&i), all.vega);
        assert_eq!(calc.rho(&i), all.rho);
        assert_eq!(calc.vanna(&i), all.vanna);
        assert_eq!(calc.volga(&i), all.volga);
    }

    #[test]
    fn test_near_expiry_snaps_to_intrinsic() {
        let calc = GreeksCalculator::with_rate(0.05);
        // 8 hours to expiry
        let t = 8.0 / (24.0 * 365.0);

        let itm_call = calc.calculate_all_greeks(&inputs(3100.0, 3000.0, t, 1.0, OptionKind::Call));
        assert_eq!(itm_call.price, 100.0);
        assert_eq!(itm_call.delta, 1.0);
        assert_eq!(itm_call.gamma, 0.0);
        assert_eq!(itm_call.theta, 0.0);
        assert_eq!(itm_call.vega, 0.0);
        assert_eq!(itm_call.rho, 0.0);
        assert_eq!(itm_call.vanna, 0.0);
        assert_eq!(itm_call.volga, 0.0);

        let otm_put = calc.calculate_all_greeks(&inputs(3100.0, 3000.0, t, 1.0, OptionKind::Put));
        assert_eq!(otm_put.price, 0.0);
        assert_eq!(otm_put.delta, 0.0);

        let itm_put = calc.calculate_all_greeks(&inputs(2900.0, 3000.0, 0.0, 1.0, OptionKind::Put));
        assert_eq!(itm_put.delta, -1.0);
        assert_eq!(calc.delta(&inputs(2900.0, 3000.0, 0.0, 1.0, OptionKind::Put)), -1.0);
    }

    #[test]
    fn test_zero_volatility_is_finite() {
        let calc = GreeksCalculator::with_rate(0.05);
        let g = calc.calculate_all_greeks(&inputs(3000.0, 2500.0, 0.5, 0.0, OptionKind::Call));
        assert!(g.price.is_finite());
        assert!(g.delta.is_finite());
    }

    #[test]
    fn test_batch_matches_scalar_path() {
        let calc = GreeksCalculator::with_rate(0.05);
        let spots = [2000.0, 2500.0, 3000.0, 3500.0];
        let strikes = [3000.0; 4];
        let times = [0.25, 0.0005, 0.1, 1.0];
        let vols = [0.8; 4];

        let batch = calc
            .calculate_batch(&spots, &strikes, &times, &vols, OptionKind::Call)
            .unwrap();

        for (i, g) in batch.iter().enumerate() {
            let scalar =
                calc.calculate_all_greeks(&inputs(spots[i], strikes[i], times[i], vols[i], OptionKind::Call));
            assert_eq!(*g, scalar);
        }
    }

    #[test]
    fn test_batch_parallel_matches_sequential() {
        let sequential = GreeksCalculator::with_rate(0.05).with_parallel_threshold(usize::MAX);
        let parallel = sequential.with_parallel_threshold(1);

        let spots: Vec<f64> = (1..=500).map(|i| f64::from(i) * 10.0).collect();
        let strikes = vec![2500.0; spots.len()];
        let times = vec![0.3; spots.len()];
        let vols = vec![0.9; spots.len()];

        let a = sequential
            .calculate_batch(&spots, &strikes, &times, &vols, OptionKind::Put)
            .unwrap();
        let b = parallel
            .calculate_batch(&spots, &strikes, &times, &vols, OptionKind::Put)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_batch_rejects_invalid_element() {
        let calc = GreeksCalculator::default();
        let result = calc.calculate_batch(&[3000.0, -1.0], &[3000.0; 2], &[0.1; 2], &[1.0; 2], OptionKind::Call);
        assert!(matches!(result, Err(PricingError::InvalidInput { .. })));
    }

    #[test]
    fn test_batch_rejects_length_mismatch() {
        let calc = GreeksCalculator::default();
        let result = calc.calculate_batch(&[3000.0; 2], &[3000.0; 2], &[0.1], &[1.0; 2], OptionKind::Call);
        assert!(matches!(result, Err(PricingError::LengthMismatch { field: "time_to_expiry", .. })));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(OptionInputs::new(0.0, 100.0, 1.0, 0.2, OptionKind::Call).is_err());
        assert!(OptionInputs::new(100.0, 0.0, 1.0, 0.2, OptionKind::Call).is_err());
        assert!(OptionInputs::new(100.0, 100.0, f64::INFINITY, 0.2, OptionKind::Call).is_err());
    }

    #[test]
    fn test_scale_and_add() {
        let g = canonical(OptionKind::Call);
        let doubled = g + g;
        let scaled = g.scale(2.0);
        assert!(approx_eq(doubled.delta, scaled.delta, 1e-12));
        assert!(approx_eq(doubled.volga, scaled.volga, 1e-12));

        let short = g.scale(-1.0);
        assert_eq!(short.gamma, -g.gamma);
    }
}
