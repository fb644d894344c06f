//! Named strategy templates.
//!
//! Each template is a fixed recipe of legs placed on a strike grid around
//! the at-the-money strike. Loading one replaces the portfolio's legs.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::analyzer::PortfolioAggregator;
use super::error::PortfolioError;
use crate::options::{OptionSpec, Position};
use crate::pricing::OptionKind::{self, Call, Put};

/// Which configured expiration a template leg uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tenor {
    /// `strategy.expiry_days` out.
    Near,
    /// `strategy.far_expiry_days` out.
    Far,
}

/// One leg of a template recipe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemplateLeg {
    /// Offset from the ATM strike in strike-grid steps.
    pub strike_steps: i32,
    /// Call or put.
    pub kind: OptionKind,
    /// Signed quantity.
    pub quantity: f64,
    /// Expiration bucket.
    pub tenor: Tenor,
}

const fn near(strike_steps: i32, kind: OptionKind, quantity: f64) -> TemplateLeg {
    TemplateLeg {
        strike_steps,
        kind,
        quantity,
        tenor: Tenor::Near,
    }
}

const fn far(strike_steps: i32, kind: OptionKind, quantity: f64) -> TemplateLeg {
    TemplateLeg {
        strike_steps,
        kind,
        quantity,
        tenor: Tenor::Far,
    }
}

const LONG_STRADDLE: &[TemplateLeg] = &[near(0, Call, 1.0), near(0, Put, 1.0)];
const SHORT_STRADDLE: &[TemplateLeg] = &[near(0, Call, -1.0), near(0, Put, -1.0)];
const LONG_STRANGLE: &[TemplateLeg] = &[near(2, Call, 1.0), near(-2, Put, 1.0)];
const SHORT_STRANGLE: &[TemplateLeg] = &[near(2, Call, -1.0), near(-2, Put, -1.0)];
const BULL_CALL_SPREAD: &[TemplateLeg] = &[near(-1, Call, 1.0), near(1, Call, -1.0)];
const BEAR_PUT_SPREAD: &[TemplateLeg] = &[near(1, Put, 1.0), near(-1, Put, -1.0)];
const IRON_CONDOR: &[TemplateLeg] = &[
    near(-3, Put, 1.0),
    near(-1, Put, -1.0),
    near(1, Call, -1.0),
    near(3, Call, 1.0),
];
const BUTTERFLY: &[TemplateLeg] = &[near(-2, Call, 1.0), near(0, Call, -2.0), near(2, Call, 1.0)];
const CALL_CALENDAR_SPREAD: &[TemplateLeg] = &[near(0, Call, -1.0), far(0, Call, 1.0)];

/// Named multi-leg strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyTemplate {
    /// Long ATM call and put.
    LongStraddle,
    /// Short ATM call and put.
    ShortStraddle,
    /// Long call two steps up, long put two steps down.
    LongStrangle,
    /// Short call two steps up, short put two steps down.
    ShortStrangle,
    /// Long call one step down, short call one step up.
    BullCallSpread,
    /// Long put one step up, short put one step down.
    BearPutSpread,
    /// Short puts/calls one step out, long wings three steps out.
    IronCondor,
    /// Long calls two steps either side, two short ATM calls.
    Butterfly,
    /// Short near ATM call, long far ATM call.
    CallCalendarSpread,
}

impl StrategyTemplate {
    /// Every template, in display order.
    pub const ALL: [Self; 9] = [
        Self::LongStraddle,
        Self::ShortStraddle,
        Self::LongStrangle,
        Self::ShortStrangle,
        Self::BullCallSpread,
        Self::BearPutSpread,
        Self::IronCondor,
        Self::Butterfly,
        Self::CallCalendarSpread,
    ];

    /// Template identifier.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LongStraddle => "long_straddle",
            Self::ShortStraddle => "short_straddle",
            Self::LongStrangle => "long_strangle",
            Self::ShortStrangle => "short_strangle",
            Self::BullCallSpread => "bull_call_spread",
            Self::BearPutSpread => "bear_put_spread",
            Self::IronCondor => "iron_condor",
            Self::Butterfly => "butterfly",
            Self::CallCalendarSpread => "call_calendar_spread",
        }
    }

    /// Comma-separated list of every template identifier.
    #[must_use]
    pub fn valid_names() -> String {
        Self::ALL.map(Self::name).join(", ")
    }

    /// Leg recipe.
    #[must_use]
    pub const fn legs(self) -> &'static [TemplateLeg] {
        match self {
            Self::LongStraddle => LONG_STRADDLE,
            Self::ShortStraddle => SHORT_STRADDLE,
            Self::LongStrangle => LONG_STRANGLE,
            Self::ShortStrangle => SHORT_STRANGLE,
            Self::BullCallSpread => BULL_CALL_SPREAD,
            Self::BearPutSpread => BEAR_PUT_SPREAD,
            Self::IronCondor => IRON_CONDOR,
            Self::Butterfly => BUTTERFLY,
            Self::CallCalendarSpread => CALL_CALENDAR_SPREAD,
        }
    }
}

impl fmt::Display for StrategyTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyTemplate {
    type Err = PortfolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| PortfolioError::UnknownStrategy {
                name: s.to_string(),
                valid: Self::valid_names(),
            })
    }
}

/// Strike grid point nearest `spot`. Ties round to the even multiple.
#[must_use]
pub fn atm_strike(spot: f64, strike_step: f64) -> f64 {
    (spot / strike_step).round_ties_even() * strike_step
}

impl PortfolioAggregator {
    /// Replace the portfolio with the named template around `current_spot`
    /// (market spot by default).
    ///
    /// Fails with [`PortfolioError::UnknownStrategy`] naming the valid set.
    /// On any error the existing legs are left untouched.
    #[instrument(skip(self))]
    pub fn load_strategy_template(
        &mut self,
        name: &str,
        current_spot: Option<f64>,
    ) -> Result<(), PortfolioError> {
        let template: StrategyTemplate = name.parse()?;
        self.load_template(template, current_spot)
    }

    /// Replace the portfolio with `template` around `current_spot`.
    ///
    /// Every leg takes the configured default volatility and an entry price
    /// from the model at that volatility and the leg's own tenor.
    pub fn load_template(
        &mut self,
        template: StrategyTemplate,
        current_spot: Option<f64>,
    ) -> Result<(), PortfolioError> {
        let spot = self.resolve_spot(current_spot)?;
        let atm = atm_strike(spot, self.strategy.strike_step);
        let valuation_date = self.market.valuation_date();

        let positions = template
            .legs()
            .iter()
            .map(|leg| self.template_position(leg, atm, spot, valuation_date))
            .collect::<Result<Vec<_>, _>>()?;

        self.positions = positions;
        info!(
            strategy = template.name(),
            atm_strike = atm,
            spot,
            legs = self.positions.len(),
            "Strategy template loaded"
        );
        Ok(())
    }

    fn template_position(
        &self,
        leg: &TemplateLeg,
        atm: f64,
        spot: f64,
        valuation_date: NaiveDate,
    ) -> Result<Position, PortfolioError> {
        let days = match leg.tenor {
            Tenor::Near => self.strategy.expiry_days,
            Tenor::Far => self.strategy.far_expiry_days,
        };
        let expiration = valuation_date
            .checked_add_days(Days::new(u64::from(days)))
            .ok_or_else(|| {
                PortfolioError::invalid_range(format!("{days} days after {valuation_date} is out of range"))
            })?;

        let strike = atm + f64::from(leg.strike_steps) * self.strategy.strike_step;
        let spec = OptionSpec::new(strike, leg.kind, expiration)?;
        let volatility = self.strategy.default_volatility;
        let position = Position::new(spec, leg.quantity).with_volatility(volatility);

        let entry_price = self
            .leg_greeks(&position, spot, spec.time_to_maturity(valuation_date), volatility)?
            .price;

        Ok(position.with_entry_price(entry_price))
    }
}
