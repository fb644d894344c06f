//! Portfolio analysis configuration.

use serde::{Deserialize, Serialize};

use crate::portfolio::RangeMode;
use crate::pricing::DEFAULT_PARALLEL_THRESHOLD;

/// Sweep and axis defaults for portfolio analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Points per spot, time or volatility sweep.
    #[serde(default = "default_num_points")]
    pub num_points: usize,
    /// Points sampled by the max-loss search.
    #[serde(default = "default_max_loss_points")]
    pub max_loss_points: usize,
    /// Absolute floor for scaled leg volatilities.
    #[serde(default = "default_min_volatility")]
    pub min_volatility: f64,
    /// Axis length at which sweeps move onto the rayon pool.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
    /// Spot axis heuristic.
    #[serde(default)]
    pub range_mode: RangeMode,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            num_points: default_num_points(),
            max_loss_points: default_max_loss_points(),
            min_volatility: default_min_volatility(),
            parallel_threshold: default_parallel_threshold(),
            range_mode: RangeMode::default(),
        }
    }
}

const fn default_num_points() -> usize {
    50
}

const fn default_max_loss_points() -> usize {
    200
}

const fn default_min_volatility() -> f64 {
    0.01
}

const fn default_parallel_threshold() -> usize {
    DEFAULT_PARALLEL_THRESHOLD
}
