//! Exchange instrument names.
//!
//! Parses venue-style option names such as `ETH-30NOV25-2600-C`.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::contract::OptionSpec;
use super::error::OptionsError;
use crate::pricing::OptionKind;

/// Expiry format inside instrument names, e.g. `30NOV25`.
const EXPIRY_FORMAT: &str = "%d%b%y";

/// An option contract together with its underlying symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Underlying symbol (e.g. `ETH`).
    pub underlying: String,
    /// Contract specification.
    pub spec: OptionSpec,
}

impl Instrument {
    /// Parse `UNDERLYING-DDMMMYY-STRIKE-KIND`.
    pub fn parse(name: &str) -> Result<Self, OptionsError> {
        let invalid = |reason: String| OptionsError::InvalidInstrument {
            name: name.to_string(),
            reason,
        };

        let parts: Vec<&str> = name.trim().split('-').collect();
        let [underlying, expiry, strike, kind] = parts.as_slice() else {
            return Err(invalid(format!(
                "expected 4 dash-separated parts, got {}",
                parts.len()
            )));
        };

        if underlying.is_empty() {
            return Err(invalid("missing underlying".to_string()));
        }
        let expiration = NaiveDate::parse_from_str(expiry, EXPIRY_FORMAT)
            .map_err(|e| invalid(format!("bad expiry '{expiry}': {e}")))?;
        let strike: f64 = strike
            .parse()
            .map_err(|e| invalid(format!("bad strike '{strike}': {e}")))?;
        let kind: OptionKind = kind.parse().map_err(|e| invalid(format!("{e}")))?;
        let spec = OptionSpec::new(strike, kind, expiration)
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            underlying: (*underlying).to_string(),
            spec,
        })
    }
}

impl FromStr for Instrument {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl OptionSpec {
    /// Parse the contract out of an instrument name, discarding the underlying.
    pub fn from_instrument_name(name: &str) -> Result<Self, OptionsError> {
        Instrument::parse(name).map(|instrument| instrument.spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_call() {
        let instrument: Instrument = "ETH-30NOV25-2600-C".parse().unwrap();
        assert_eq!(instrument.underlying, "ETH");
        assert_eq!(instrument.spec.strike(), 2600.0);
        assert_eq!(instrument.spec.kind(), OptionKind::Call);
        assert_eq!(
            instrument.spec.expiration(),
            NaiveDate::from_ymd_opt(2025, 11, 30).unwrap()
        );
    }

    #[test]
    fn test_parse_single_digit_day_put() {
        let spec = OptionSpec::from_instrument_name("BTC-5DEC25-90000-P").unwrap();
        assert_eq!(spec.kind(), OptionKind::Put);
        assert_eq!(spec.expiration(), NaiveDate::from_ymd_opt(2025, 12, 5).unwrap());
    }

    #[test]
    fn test_rejects_malformed_names() {
        for name in [
            "ETH-30NOV25-2600",
            "ETH-30XYZ25-2600-C",
            "ETH-30NOV25-abc-C",
            "ETH-30NOV25-2600-X",
            "ETH-30NOV25-0-C",
            "-30NOV25-2600-C",
        ] {
            let err = Instrument::parse(name).unwrap_err();
            assert!(
                matches!(err, OptionsError::InvalidInstrument { .. }),
                "{name} should be rejected"
            );
        }
    }
}
