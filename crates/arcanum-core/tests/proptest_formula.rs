//! Property-based tests for the formula evaluator.
//!
//! Uses proptest to sweep series parameters and compare the closed form
//! against a double-precision term-by-term sum.

use arcanum_core::config::{ConfigLink, MapConfigStore};
use arcanum_core::formula::{ConfigSwitch, ValueExpr, diminishing_sum};
use arcanum_core::rng::SimRng;
use arcanum_core::test_utils::{approx_eq, decode_json};
use proptest::prelude::*;
use std::collections::BTreeMap;

// ===========================================================================
// Reference
// ===========================================================================

/// O(level) sum in f64: first term `base`, later terms clamped at `floor`.
fn naive_sum(base: f32, decrement: f32, floor: f32, level: i32) -> f64 {
    let (base, decrement, floor) = (f64::from(base), f64::from(decrement), f64::from(floor));
    (0..level.max(0))
        .map(|i| {
            let term = base - f64::from(i) * decrement;
            if i == 0 { term } else { term.max(floor) }
        })
        .sum()
}

/// Either exactly zero or clear of the "no decay" epsilon band.
fn arb_decrement() -> impl Strategy<Value = f32> {
    prop_oneof![Just(0.0f32), 0.01f32..=10.0]
}

/// (base, decrement, floor) with floor in [0, base].
fn arb_series() -> impl Strategy<Value = (f32, f32, f32)> {
    (0.0f32..=50.0, arb_decrement(), 0.0f32..=1.0)
        .prop_map(|(base, decrement, fraction)| (base, decrement, base * fraction))
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// Closed form equals the iterative sum within tolerance.
    #[test]
    fn closed_form_matches_iterative((base, decrement, floor) in arb_series(), level in 0..=50i32) {
        let closed = diminishing_sum(base, decrement, floor, level);
        let naive = naive_sum(base, decrement, floor, level) as f32;
        prop_assert!(approx_eq(closed, naive), "closed {} vs naive {}", closed, naive);
    }

    /// Each added level contributes at least `floor`.
    #[test]
    fn added_level_respects_floor((base, decrement, floor) in arb_series(), level in 0..50i32) {
        let step = diminishing_sum(base, decrement, floor, level + 1)
            - diminishing_sum(base, decrement, floor, level);
        let slack = 1.0e-4 * diminishing_sum(base, decrement, floor, level + 1).max(1.0);
        prop_assert!(step >= floor - slack, "step {} below floor {}", step, floor);
    }

    /// Level zero is zero for the series and for an unshifted polynomial.
    #[test]
    fn level_zero_is_zero((base, decrement, floor) in arb_series(), scale in -5.0f32..5.0, power in 0.1f32..4.0) {
        let mut rng = SimRng::new(0);
        prop_assert_eq!(ValueExpr::constant(base, decrement, floor).evaluate(0, &mut rng), 0.0);
        prop_assert_eq!(ValueExpr::polynomial(scale, power, 0.0, 0.0).evaluate(0, &mut rng).abs(), 0.0);
    }

    /// An unbound switch evaluates exactly like its fallback, whatever the cases.
    #[test]
    fn unbound_switch_matches_fallback(
        case_values in proptest::collection::btree_map("[a-z]{1,6}", 0.0f32..10.0, 0..4),
        fallback in 0.0f32..10.0,
        level in 0..30i32,
    ) {
        let config = MapConfigStore::new();
        let link = ConfigLink::bind(&config, "arcanum.absent")
            .unwrap_or_else(|_| ConfigLink::unbound("arcanum.absent"));
        let cases: BTreeMap<String, ValueExpr> = case_values
            .into_iter()
            .map(|(k, v)| (k, ValueExpr::per_level(v)))
            .collect();
        let fallback_expr = ValueExpr::polynomial(fallback, 1.0, 0.0, 0.0);
        let switch: ValueExpr = ConfigSwitch::new(link, cases, fallback_expr.clone()).into();

        let mut rng = SimRng::new(1);
        prop_assert_eq!(switch.evaluate(level, &mut rng), fallback_expr.evaluate(level, &mut rng));
    }
}

// ===========================================================================
// Fixed scenarios
// ===========================================================================

#[test]
fn worked_example_from_data() {
    let expr = decode_json(&serde_json::json!({
        "type": "constant", "base": 10, "decrement": 3, "floor": 1
    }))
    .unwrap();
    assert_eq!(expr.evaluate(5, &mut SimRng::new(0)), 23.0);
}

#[test]
fn probabilistic_success_rate_tracks_chance() {
    let expr = ValueExpr::probabilistic(ValueExpr::constant(0.3, 0.0, 0.0));
    let mut rng = SimRng::new(0xA11CE);
    let trials = 100_000;
    let zeros = (0..trials)
        .filter(|_| expr.evaluate(1, &mut rng) == 0.0)
        .count();
    let fraction = zeros as f64 / f64::from(trials);
    assert!((0.29..=0.31).contains(&fraction), "expected ~0.30, got {fraction}");
}
