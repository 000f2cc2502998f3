use fincalc_rs::{
    compute_schedule, discounted_payback_period, npv, npv_sensitivity, payback_period, solve_irr,
    CalculatorConfig, CalculatorError, Money, Rate, ScheduleLimits, SolverConfig,
};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

fn flows(values: &[i64]) -> Vec<Money> {
    values.iter().map(|v| Money::from_major(*v)).collect()
}

/// conventional shapes: one outlay followed by inflows
fn conventional_projects() -> Vec<Vec<Money>> {
    vec![
        flows(&[-10_000, 3_000, 4_000]),
        flows(&[-1_000, 300, 400, 500]),
        flows(&[-50_000, 12_000, 12_000, 12_000, 12_000, 12_000]),
        flows(&[-1_000, 0, 0, 1_500]),
        flows(&[-250, 100, 100, 100, 100]),
    ]
}

// ===========================================================================
// IRR / NPV properties
// ===========================================================================

#[test]
fn test_npv_is_zero_at_converged_irr() {
    let config = SolverConfig::default();
    for cash in conventional_projects() {
        let result = solve_irr(&cash, &config).unwrap();

        assert!(result.converged, "did not converge for {cash:?}");
        assert!(result.npv_at_irr.as_decimal().abs() <= config.tolerance);
        assert!(npv(&cash, result.irr).unwrap().abs() < Money::CENT);
    }
}

#[test]
fn test_npv_decreases_with_rate() {
    for cash in conventional_projects() {
        let points = npv_sensitivity(&cash, Rate::ZERO, Rate::from_percentage(30), 12).unwrap();

        assert_eq!(points.len(), 13);
        for pair in points.windows(2) {
            assert!(pair[1].npv < pair[0].npv, "npv rose between {} and {}", pair[0].rate, pair[1].rate);
        }
    }
}

#[test]
fn test_irr_sign_matches_undiscounted_sum() {
    let config = SolverConfig::default();
    for cash in conventional_projects() {
        let result = solve_irr(&cash, &config).unwrap();
        let total: Money = cash.iter().sum();

        assert_eq!(result.irr.is_negative(), total.is_negative());
    }
}

// ===========================================================================
// Long horizons
// ===========================================================================

/// an outlay followed by `periods` equal inflows
fn level_series(outlay: i64, inflow: Money, periods: usize) -> Vec<Money> {
    let mut cash = flows(&[-outlay]);
    cash.extend(std::iter::repeat(inflow).take(periods));
    cash
}

#[test]
fn test_irr_of_a_thirty_year_mortgage_is_the_note_rate() {
    let schedule = compute_schedule(
        Money::from_major(100_000),
        Rate::from_percentage(6),
        360,
        &[],
        &ScheduleLimits::default(),
    )
    .unwrap();
    let mut cash = flows(&[-100_000]);
    cash.extend(schedule.rows.iter().map(|r| r.total_payment));

    let result = solve_irr(&cash, &SolverConfig::default()).unwrap();

    assert!(result.converged);
    assert_eq!(cash.len(), 361);
    assert_eq!(result.irr.as_decimal().round_dp(5), dec!(0.005));
    assert!(npv(&cash, result.irr).unwrap().abs() < Money::CENT);
}

#[test]
fn test_long_series_with_negative_irr() {
    let config = SolverConfig::default();

    let five_years = solve_irr(&level_series(10_000, Money::from_major(100), 60), &config).unwrap();
    assert!(five_years.converged);
    assert_eq!(five_years.irr.as_decimal().round_dp(4), dec!(-0.0154));

    // 360 * 250 = 90,000 back on 100,000
    let thirty_years = solve_irr(&level_series(100_000, Money::from_major(250), 360), &config).unwrap();
    assert!(thirty_years.converged);
    assert!(thirty_years.irr.is_negative());
    assert_eq!(thirty_years.irr.as_decimal().round_dp(5), dec!(-0.00057));
}

#[test]
fn test_sensitivity_and_npv_over_360_periods() {
    let cash = level_series(100_000, Money::from_decimal(dec!(599.55)), 360);

    let points = npv_sensitivity(&cash, Rate::ZERO, Rate::from_percentage(30), 30).unwrap();
    assert_eq!(points.len(), 31);
    assert!(points.windows(2).all(|w| w[1].npv < w[0].npv));
    // at high rates only the outlay and the first inflows matter
    assert!(points[30].npv > Money::from_major(-100_000));

    // far past Decimal range if compounded forward
    assert_eq!(
        npv(&level_series(100_000, Money::from_major(1_000), 300), Rate::from_percentage(30))
            .unwrap()
            .round_cents(),
        Money::from_decimal(dec!(-96666.67))
    );
}

// ===========================================================================
// Concrete scenarios
// ===========================================================================

#[test]
fn test_scenario_irr_below_zero() {
    let cash = flows(&[-10_000, 3_000, 4_000]);
    let result = solve_irr(&cash, &SolverConfig::default()).unwrap();

    assert!(result.converged);
    assert!(result.irr.is_negative());
    assert_eq!(result.irr.as_percentage().round_dp(4), dec!(-20));
    assert_eq!(result.payback_period, None);
}

#[test]
fn test_no_sign_change_is_distinct_from_non_convergence() {
    assert_eq!(
        solve_irr(&flows(&[1_000, 2_000]), &SolverConfig::default()),
        Err(CalculatorError::NoSignChange)
    );

    let capped = SolverConfig {
        max_iterations: 1,
        ..SolverConfig::default()
    };
    let result = solve_irr(&flows(&[-10_000, 3_000, 4_000]), &capped).unwrap();
    assert!(!result.converged);
}

#[test]
fn test_solver_config_from_json() {
    let config = CalculatorConfig::from_json(r#"{"solver":{"initial_guess":"0.25"}}"#).unwrap();
    let result = solve_irr(&flows(&[-100, 230, -132]), &config.solver).unwrap();

    assert!(result.converged);
    assert_eq!(result.irr.as_decimal().round_dp(6), dec!(0.2));
}

#[test]
fn test_payback_variants() {
    let cash = flows(&[-1_000, 300, 400, 500]);

    assert_eq!(payback_period(&cash), Some(dec!(2.6)));
    assert_eq!(
        discounted_payback_period(&cash, Rate::ZERO).unwrap(),
        payback_period(&cash)
    );
    assert!(discounted_payback_period(&cash, Rate::from_percentage(5)).unwrap().unwrap() > dec!(2.6));
}
