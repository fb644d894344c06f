//! Quantity-weighted Greeks aggregation.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::pricing::GreeksResult;

/// Sum of per-leg Greeks weighted by signed quantity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioAggregate {
    /// Net delta.
    pub delta: f64,
    /// Net gamma.
    pub gamma: f64,
    /// Net annualized theta.
    pub theta: f64,
    /// Net theta per calendar day.
    pub theta_daily: f64,
    /// Net vega per unit of volatility.
    pub vega: f64,
    /// Net vega per 1% volatility move.
    pub vega_percent: f64,
    /// Net rho.
    pub rho: f64,
    /// Net vanna.
    pub vanna: f64,
    /// Net volga.
    pub volga: f64,
    /// Σ price × quantity.
    pub position_value: f64,
}

impl PortfolioAggregate {
    /// Zero aggregate (empty portfolio).
    pub const ZERO: Self = Self {
        delta: 0.0,
        gamma: 0.0,
        theta: 0.0,
        theta_daily: 0.0,
        vega: 0.0,
        vega_percent: 0.0,
        rho: 0.0,
        vanna: 0.0,
        volga: 0.0,
        position_value: 0.0,
    };

    /// Contribution of one leg holding `quantity` units.
    #[must_use]
    pub fn from_leg(greeks: &GreeksResult, quantity: f64) -> Self {
        let scaled = greeks.scale(quantity);
        Self {
            delta: scaled.delta,
            gamma: scaled.gamma,
            theta: scaled.theta,
            theta_daily: scaled.theta_daily,
            vega: scaled.vega,
            vega_percent: scaled.vega_percent,
            rho: scaled.rho,
            vanna: scaled.vanna,
            volga: scaled.volga,
            position_value: scaled.price,
        }
    }
}

impl Add for PortfolioAggregate {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            delta: self.delta + rhs.delta,
            gamma: self.gamma + rhs.gamma,
            theta: self.theta + rhs.theta,
            theta_daily: self.theta_daily + rhs.theta_daily,
            vega: self.vega + rhs.vega,
            vega_percent: self.vega_percent + rhs.vega_percent,
            rho: self.rho + rhs.rho,
            vanna: self.vanna + rhs.vanna,
            volga: self.volga + rhs.volga,
            position_value: self.position_value + rhs.position_value,
        }
    }
}

impl AddAssign for PortfolioAggregate {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for PortfolioAggregate {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
