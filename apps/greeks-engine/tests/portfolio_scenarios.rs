//! Portfolio aggregation, sweeps and strategy templates through the
//! public API.

#![allow(clippy::unwrap_used)]

use chrono::{Days, NaiveDate};
use greeks_engine::options::{OptionSpec, Position};
use greeks_engine::portfolio::{
    MarketState, PortfolioAggregate, PortfolioAggregator, PortfolioError, RangeMode, SpotSweep,
    StrategyTemplate, atm_strike, price_range,
};
use greeks_engine::pricing::OptionKind;
use proptest::prelude::*;
use test_case::test_case;

const SPOT: f64 = 3000.0;

fn today() -> NaiveDate {
    match NaiveDate::from_ymd_opt(2025, 11, 30) {
        Some(date) => date,
        None => panic!("valid date"),
    }
}

fn in_days(days: u64) -> NaiveDate {
    today().checked_add_days(Days::new(days)).unwrap()
}

fn portfolio() -> PortfolioAggregator {
    match MarketState::new(SPOT, today()) {
        Ok(market) => PortfolioAggregator::new(market),
        Err(e) => panic!("market rejected: {e}"),
    }
}

fn leg(strike: f64, kind: OptionKind, quantity: f64, vol: f64, days: u64) -> Position {
    match OptionSpec::new(strike, kind, in_days(days)) {
        Ok(spec) => Position::new(spec, quantity).with_volatility(vol),
        Err(e) => panic!("contract rejected: {e}"),
    }
}

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol * (1.0 + a.abs().max(b.abs()))
}

fn aggregates_match(a: &PortfolioAggregate, b: &PortfolioAggregate) -> bool {
    [
        (a.delta, b.delta),
        (a.gamma, b.gamma),
        (a.theta, b.theta),
        (a.theta_daily, b.theta_daily),
        (a.vega, b.vega),
        (a.vega_percent, b.vega_percent),
        (a.rho, b.rho),
        (a.vanna, b.vanna),
        (a.volga, b.volga),
        (a.position_value, b.position_value),
    ]
    .into_iter()
    .all(|(x, y)| approx_eq(x, y, 1e-9))
}

fn loaded(name: &str) -> PortfolioAggregator {
    let mut p = portfolio();
    if let Err(e) = p.load_strategy_template(name, None) {
        panic!("template {name} failed to load: {e}");
    }
    p
}

// ============================================================================
// Aggregation properties
// ============================================================================

fn leg_strategy() -> impl Strategy<Value = Position> {
    (
        1000.0f64..6000.0,
        prop_oneof![Just(OptionKind::Call), Just(OptionKind::Put)],
        prop_oneof![-3.0f64..-0.5, 0.5f64..3.0],
        0.2f64..2.0,
        1u64..120,
    )
        .prop_map(|(strike, kind, qty, vol, days)| leg(strike, kind, qty, vol, days))
}

proptest! {
    #[test]
    fn disjoint_portfolios_add_up(
        left in prop::collection::vec(leg_strategy(), 0..5),
        right in prop::collection::vec(leg_strategy(), 0..5),
    ) {
        let mut a = portfolio();
        let mut b = portfolio();
        let mut both = portfolio();
        for p in &left {
            a.add_position(*p);
            both.add_position(*p);
        }
        for p in &right {
            b.add_position(*p);
            both.add_position(*p);
        }

        let sum = a.aggregate_greeks(None, None, 1.0, 0).unwrap()
            + b.aggregate_greeks(None, None, 1.0, 0).unwrap();
        let combined = both.aggregate_greeks(None, None, 1.0, 0).unwrap();
        prop_assert!(aggregates_match(&sum, &combined), "{sum:?} != {combined:?}");
    }

    #[test]
    fn quantities_scale_linearly(
        legs in prop::collection::vec(leg_strategy(), 1..5),
        factor in 0.5f64..4.0,
    ) {
        let mut base = portfolio();
        let mut scaled = portfolio();
        for p in &legs {
            base.add_position(*p);
            let spec = *p.spec();
            scaled.add_position(Position::new(spec, p.quantity() * factor).with_volatility(p.volatility()));
        }

        let b = base.aggregate_greeks(None, None, 1.0, 0).unwrap();
        let s = scaled.aggregate_greeks(None, None, 1.0, 0).unwrap();
        prop_assert!(approx_eq(s.delta, b.delta * factor, 1e-9));
        prop_assert!(approx_eq(s.gamma, b.gamma * factor, 1e-9));
        prop_assert!(approx_eq(s.vega, b.vega * factor, 1e-9));
        prop_assert!(approx_eq(s.position_value, b.position_value * factor, 1e-9));
    }

    #[test]
    fn spot_sweep_matches_scalar_aggregate(
        legs in prop::collection::vec(leg_strategy(), 1..4),
        offset in 0i64..20,
    ) {
        let mut p = portfolio();
        for l in &legs {
            p.add_position(*l);
        }
        let sweep = SpotSweep {
            spot_min: Some(2000.0),
            spot_max: Some(4000.0),
            num_points: Some(9),
            time_offset_days: offset,
            ..SpotSweep::default()
        };
        let series = p.greeks_vs_spot(&sweep).unwrap();
        for point in &series.points {
            let scalar = p.aggregate_greeks(Some(point.spot), None, 1.0, offset).unwrap();
            prop_assert_eq!(point.aggregate, scalar);
        }
    }
}

// ============================================================================
// Strategy templates
// ============================================================================

#[test_case("long_straddle", &[3000.0, 3000.0], 2.0 ; "long straddle")]
#[test_case("short_straddle", &[3000.0, 3000.0], -2.0 ; "short straddle")]
#[test_case("long_strangle", &[3200.0, 2800.0], 2.0 ; "long strangle")]
#[test_case("short_strangle", &[3200.0, 2800.0], -2.0 ; "short strangle")]
#[test_case("bull_call_spread", &[2900.0, 3100.0], 0.0 ; "bull call spread")]
#[test_case("bear_put_spread", &[3100.0, 2900.0], 0.0 ; "bear put spread")]
#[test_case("iron_condor", &[2700.0, 2900.0, 3100.0, 3300.0], 0.0 ; "iron condor")]
#[test_case("butterfly", &[2800.0, 3000.0, 3200.0], 0.0 ; "butterfly")]
#[test_case("call_calendar_spread", &[3000.0, 3000.0], 0.0 ; "calendar spread")]
fn template_places_legs_on_grid(name: &str, strikes: &[f64], net_quantity: f64) {
    let p = loaded(name);
    let placed: Vec<f64> = p.positions().iter().map(Position::strike).collect();
    assert_eq!(placed, strikes);
    assert_eq!(p.summary().net_quantity, net_quantity);
    assert!(p.positions().iter().all(|l| l.entry_price().is_some()));
    assert!(p.positions().iter().all(|l| l.volatility() == 1.0));
}

#[test]
fn every_template_parses_by_name() {
    for template in StrategyTemplate::ALL {
        assert_eq!(template.name().parse::<StrategyTemplate>().unwrap(), template);
        assert!(!template.legs().is_empty());
    }
}

#[test]
fn calendar_spread_uses_two_expiries() {
    let p = loaded("call_calendar_spread");
    let expirations: Vec<NaiveDate> = p.positions().iter().map(Position::expiration).collect();
    assert_eq!(expirations, vec![in_days(30), in_days(60)]);
    assert_eq!(p.summary().unique_expirations, 2);
    assert!(p.positions()[0].is_short());
    assert!(p.positions()[1].is_long());
}

#[test]
fn unknown_template_lists_valid_names() {
    let mut p = loaded("long_straddle");
    let err = p.load_strategy_template("iron_butterfly", None).unwrap_err();
    match &err {
        PortfolioError::UnknownStrategy { name, valid } => {
            assert_eq!(name, "iron_butterfly");
            assert!(valid.contains("long_straddle"));
            assert!(valid.contains("call_calendar_spread"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().starts_with("Unknown strategy 'iron_butterfly'"));
    // Failed load leaves the portfolio alone
    assert_eq!(p.len(), 2);
}

#[test_case(3049.0, 3000.0 ; "rounds down")]
#[test_case(3050.0, 3000.0 ; "tie to even below")]
#[test_case(3150.0, 3200.0 ; "tie to even above")]
#[test_case(3051.0, 3100.0 ; "rounds up")]
fn atm_strike_rounds_to_grid(spot: f64, expected: f64) {
    assert_eq!(atm_strike(spot, 100.0), expected);
}

#[test]
fn long_straddle_is_long_volatility() {
    let greeks = loaded("long_straddle").aggregate_greeks(None, None, 1.0, 0).unwrap();
    assert!(approx_eq(greeks.delta, 0.125_291, 1e-5), "delta {}", greeks.delta);
    assert!(greeks.delta.abs() < 0.15);
    assert!(greeks.gamma > 0.0);
    assert!(greeks.theta_daily < 0.0);
    assert!(greeks.vega > 0.0);
}

#[test]
fn short_strangle_is_short_volatility() {
    let greeks = loaded("short_strangle").aggregate_greeks(None, None, 1.0, 0).unwrap();
    assert!(approx_eq(greeks.delta, -0.127_925, 1e-5), "delta {}", greeks.delta);
    assert!(greeks.gamma < 0.0);
    assert!(greeks.theta_daily > 0.0);
    assert!(greeks.vega < 0.0);
}

// ============================================================================
// Cost basis, PnL and max loss
// ============================================================================

#[test]
fn cost_basis_ignores_sweep_time_offset() {
    let mut p = portfolio();
    p.add_position(leg(3000.0, OptionKind::Call, 1.0, 0.8, 30).with_entry_price(275.0));
    p.add_position(leg(2800.0, OptionKind::Put, -2.0, 0.9, 45).with_entry_price(190.0));

    let now = p.pnl_vs_spot(&SpotSweep::default()).unwrap();
    let later = p
        .pnl_vs_spot(&SpotSweep {
            time_offset_days: 20,
            ..SpotSweep::default()
        })
        .unwrap();

    assert_eq!(now.cost_basis, later.cost_basis);
    assert_eq!(now.cost_basis, 275.0 - 380.0);
    // Time passing changes the value, not the basis
    assert_ne!(now.current_value, later.current_value);
}

#[test]
fn estimated_cost_basis_is_flagged() {
    let mut p = portfolio();
    p.add_position(leg(3000.0, OptionKind::Call, 1.0, 0.8, 30));
    p.add_position(leg(3000.0, OptionKind::Put, 1.0, 0.8, 30).with_entry_price(150.0));

    let basis = p.cost_basis_detail(None).unwrap();
    assert!(basis.is_estimated);
    assert_eq!(basis.estimated_legs, 1);
}

#[test]
fn single_long_call_loses_at_most_its_premium() {
    let mut p = portfolio();
    p.add_position(leg(3000.0, OptionKind::Call, 1.0, 1.0, 30).with_entry_price(347.43));

    let cost_basis = p.cost_basis(None).unwrap();
    let max_loss = p.max_loss_at_expiration(None, None, None, None).unwrap();
    assert!(approx_eq(max_loss, -cost_basis, 1e-12));
    assert!(approx_eq(max_loss, -347.43, 1e-12));
}

#[test]
fn pnl_is_value_minus_basis() {
    let p = loaded("iron_condor");
    let series = p.pnl_vs_spot(&SpotSweep::default()).unwrap();
    assert_eq!(series.points.len(), 50);
    for point in &series.points {
        assert_eq!(point.pnl, point.aggregate.position_value - series.cost_basis);
    }
}

// ============================================================================
// Spot axes
// ============================================================================

#[test_case(RangeMode::Smart, (30.0, 32000.0) ; "smart")]
#[test_case(RangeMode::Linear, (30.0, 300_000.0) ; "linear")]
#[test_case(RangeMode::StrikeBased, (280.0, 32000.0) ; "strike based")]
fn range_mode_bounds(mode: RangeMode, expected: (f64, f64)) {
    let (lo, hi) = price_range(mode, SPOT, &[2800.0, 3200.0]);
    assert!(approx_eq(lo, expected.0, 1e-12));
    assert!(approx_eq(hi, expected.1, 1e-12));

    let p = loaded("long_strangle");
    let (plo, phi) = p.smart_price_range(mode);
    assert!(approx_eq(plo, expected.0, 1e-12));
    assert!(approx_eq(phi, expected.1, 1e-12));
}

#[test]
fn empty_portfolio_sweeps_are_flat() {
    let p = portfolio();
    let series = p.greeks_vs_spot(&SpotSweep::default()).unwrap();
    assert_eq!(series.points.first().map(|pt| pt.spot), Some(1500.0));
    assert_eq!(series.points.last().map(|pt| pt.spot), Some(4500.0));
    assert!(series.points.iter().all(|pt| pt.aggregate == PortfolioAggregate::ZERO));
    assert_eq!(p.max_loss_at_expiration(None, None, None, None).unwrap(), 0.0);
}

#[test]
fn log_axis_is_geometric_and_floored() {
    let p = loaded("long_straddle");
    let series = p
        .greeks_vs_spot(&SpotSweep {
            spot_min: Some(0.1),
            spot_max: Some(10_000.0),
            num_points: Some(5),
            use_log_scale: true,
            ..SpotSweep::default()
        })
        .unwrap();
    let spots: Vec<f64> = series.points.iter().map(|pt| pt.spot).collect();
    assert_eq!(spots[0], 1.0);
    assert_eq!(spots[4], 10_000.0);
    assert!(approx_eq(spots[2], 100.0, 1e-9));
}

#[test]
fn volatility_sensitivity_keeps_stored_volatility() {
    let p = loaded("long_straddle");
    let points = p.volatility_sensitivity((-0.5, 0.5), Some(5), None, None).unwrap();
    assert_eq!(points.len(), 5);
    // Long vega: value rises with volatility
    assert!(points.windows(2).all(|w| w[1].aggregate.position_value > w[0].aggregate.position_value));
    assert!(p.positions().iter().all(|l| l.volatility() == 1.0));
}
