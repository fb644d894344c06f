//! Configuration module for the greeks engine.
//!
//! Loads YAML configuration with environment variable interpolation and
//! validates it before any calculator is built from it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use greeks_engine::config::load_config;
//!
//! // Load from default path (greeks.yaml)
//! let config = load_config(None)?;
//!
//! println!("risk-free rate: {}", config.pricing.risk_free_rate);
//! ```

mod analysis;
mod observability;
mod pricing;
mod strategy;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use analysis::AnalysisConfig;
pub use observability::{LoggingConfig, ObservabilityConfig};
pub use pricing::PricingConfig;
pub use strategy::StrategyConfig;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "greeks.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure. Every section is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Pricing model configuration.
    #[serde(default)]
    pub pricing: PricingConfig,
    /// Sweep and axis configuration.
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Strategy template configuration.
    #[serde(default)]
    pub strategy: StrategyConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// `path` defaults to [`DEFAULT_CONFIG_PATH`].
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    // An empty document deserializes to null, not to an empty mapping
    let config: Config = if interpolated.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml_bw::from_str(&interpolated)?
    };
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax. A variable that is
/// unset or empty takes the default, or the empty string without one.
#[allow(clippy::expect_used)] // Regex is a compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let pricing = &config.pricing;
    if !(-1.0..=1.0).contains(&pricing.risk_free_rate) {
        return Err(ConfigError::ValidationError(
            "pricing.risk_free_rate must be between -1.0 and 1.0".to_string(),
        ));
    }
    if pricing.expiry_threshold_years <= 0.0 {
        return Err(ConfigError::ValidationError(
            "pricing.expiry_threshold_years must be positive".to_string(),
        ));
    }

    let analysis = &config.analysis;
    if analysis.num_points < 2 || analysis.max_loss_points < 2 {
        return Err(ConfigError::ValidationError(
            "analysis.num_points and analysis.max_loss_points must be at least 2".to_string(),
        ));
    }
    if analysis.min_volatility <= 0.0 {
        return Err(ConfigError::ValidationError(
            "analysis.min_volatility must be positive".to_string(),
        ));
    }

    let strategy = &config.strategy;
    if strategy.default_volatility <= 0.0 {
        return Err(ConfigError::ValidationError(
            "strategy.default_volatility must be positive".to_string(),
        ));
    }
    if strategy.strike_step <= 0.0 {
        return Err(ConfigError::ValidationError(
            "strategy.strike_step must be positive".to_string(),
        ));
    }
    if strategy.expiry_days == 0 || strategy.far_expiry_days <= strategy.expiry_days {
        return Err(ConfigError::ValidationError(
            "strategy.far_expiry_days must exceed strategy.expiry_days, which must be positive"
                .to_string(),
        ));
    }

    let valid_formats = ["pretty", "json"];
    let format = config.observability.logging.format.as_str();
    if !valid_formats.contains(&format) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {valid_formats:?}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::RangeMode;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!((config.pricing.risk_free_rate - 0.05).abs() < f64::EPSILON);
        assert!((config.pricing.expiry_threshold_years - 0.001).abs() < f64::EPSILON);
        assert_eq!(config.analysis.num_points, 50);
        assert_eq!(config.analysis.max_loss_points, 200);
        assert_eq!(config.analysis.range_mode, RangeMode::Smart);
        assert_eq!(config.strategy.expiry_days, 30);
        assert_eq!(config.strategy.far_expiry_days, 60);
        assert_eq!(config.observability.logging.format, "pretty");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_empty_config() {
        let config = match load_config_from_string("") {
            Ok(c) => c,
            Err(e) => panic!("should load empty config: {e}"),
        };
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_partial_config() {
        let yaml = r"
pricing:
  risk_free_rate: 0.03
analysis:
  range_mode: strike_based
";

        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load partial config: {e}"),
        };
        assert!((config.pricing.risk_free_rate - 0.03).abs() < f64::EPSILON);
        assert_eq!(config.analysis.range_mode, RangeMode::StrikeBased);
        // Untouched sections keep defaults
        assert_eq!(config.analysis.num_points, 50);
        assert_eq!(config.strategy, StrategyConfig::default());
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        let input = "format: ${GREEKS_CONFIG_TEST_NONEXISTENT_VAR:-json}";
        let result = interpolate_env_vars(input);
        assert_eq!(result, "format: json");
    }

    #[test]
    #[expect(clippy::literal_string_with_formatting_args)] // ${...} is env var syntax, not format args
    fn test_env_var_with_default_uses_existing() {
        // PATH should always exist
        let input = "path: ${PATH:-default}";
        let result = interpolate_env_vars(input);
        assert_ne!(result, "path: default");
        assert!(result.starts_with("path: "));
    }

    #[test]
    fn test_env_var_without_default_becomes_empty() {
        let input = "level: ${GREEKS_CONFIG_TEST_UNLIKELY_TO_EXIST}";
        assert_eq!(interpolate_env_vars(input), "level: ");
    }

    #[test]
    fn test_env_var_interpolated_into_numeric_field() {
        let yaml = "pricing:\n  risk_free_rate: ${GREEKS_CONFIG_TEST_RATE_UNSET:-0.02}\n";
        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should interpolate rate: {e}"),
        };
        assert!((config.pricing.risk_free_rate - 0.02).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validation_invalid_risk_free_rate() {
        let yaml = "pricing:\n  risk_free_rate: 1.5\n";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for invalid risk_free_rate");
        };
        assert!(err.to_string().contains("risk_free_rate"));
    }

    #[test]
    fn test_validation_calendar_tenors() {
        let yaml = "strategy:\n  expiry_days: 60\n  far_expiry_days: 30\n";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for inverted tenors");
        };
        assert!(err.to_string().contains("far_expiry_days"));
    }

    #[test]
    fn test_validation_too_few_points() {
        let yaml = "analysis:\n  num_points: 1\n";
        assert!(matches!(
            load_config_from_string(yaml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_invalid_log_format() {
        let yaml = "observability:\n  logging:\n    format: xml\n";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for invalid log format");
        };
        assert!(err.to_string().contains("format"));
    }

    #[test]
    fn test_parse_error() {
        let yaml = "pricing: [not, a, mapping]\n";
        assert!(matches!(
            load_config_from_string(yaml),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = match tempfile::NamedTempFile::new() {
            Ok(f) => f,
            Err(e) => panic!("should create temp file: {e}"),
        };
        if let Err(e) = writeln!(file, "strategy:\n  default_volatility: 0.8\n  strike_step: 50") {
            panic!("should write config: {e}");
        }

        let path = file.path().to_string_lossy().into_owned();
        let config = match load_config(Some(&path)) {
            Ok(c) => c,
            Err(e) => panic!("should load config file: {e}"),
        };
        assert!((config.strategy.default_volatility - 0.8).abs() < f64::EPSILON);
        assert!((config.strategy.strike_step - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config(Some("/nonexistent/greeks.yaml"));
        let Err(ConfigError::ReadError { path, .. }) = result else {
            panic!("expected read error");
        };
        assert_eq!(path, "/nonexistent/greeks.yaml");
    }
}
