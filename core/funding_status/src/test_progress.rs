use proptest::prelude::*;

use crate::invariants::assert_progress_bounded;
use crate::{calculate_funding_progress, format_percentage};

#[test]
fn test_half_funded() {
    assert_eq!(calculate_funding_progress(50_000.0, 100_000.0), 50.0);
}

#[test]
fn test_over_funded_is_clamped() {
    assert_eq!(calculate_funding_progress(150_000.0, 100_000.0), 100.0);
}

#[test]
fn test_zero_goal_does_not_divide() {
    assert_eq!(calculate_funding_progress(10_000.0, 0.0), 0.0);
    assert_eq!(calculate_funding_progress(10_000.0, -5.0), 0.0);
    assert_eq!(calculate_funding_progress(0.0, 0.0), 0.0);
}

#[test]
fn test_negative_and_nan_inputs() {
    assert_eq!(calculate_funding_progress(-10.0, 100.0), 0.0);
    assert_eq!(calculate_funding_progress(f64::NAN, 100.0), 0.0);
    assert_eq!(calculate_funding_progress(100.0, f64::NAN), 0.0);
}

#[test]
fn test_infinite_inputs() {
    assert_eq!(calculate_funding_progress(f64::INFINITY, f64::INFINITY), 0.0);
    assert_eq!(calculate_funding_progress(f64::INFINITY, 100.0), 100.0);
    assert_eq!(calculate_funding_progress(100.0, f64::INFINITY), 0.0);
    assert_eq!(calculate_funding_progress(f64::NEG_INFINITY, 100.0), 0.0);
}

#[test]
fn test_progress_is_not_rounded() {
    let p = calculate_funding_progress(1.0, 3.0);
    assert!((p - 33.333_333).abs() < 1e-4);
    assert_eq!(format_percentage(p), "33%");
}

proptest! {
    #[test]
    fn progress_is_bounded(current in 0.0f64..1e12, target in 1e-3f64..1e12) {
        assert_progress_bounded(calculate_funding_progress(current, target));
    }

    #[test]
    fn progress_is_bounded_for_any_float(
        current in proptest::num::f64::ANY,
        target in proptest::num::f64::ANY,
    ) {
        assert_progress_bounded(calculate_funding_progress(current, target));
    }

    #[test]
    fn progress_is_monotonic(a in 0.0f64..1e9, b in 0.0f64..1e9, target in 1.0f64..1e9) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            calculate_funding_progress(lo, target) <= calculate_funding_progress(hi, target)
        );
    }

    #[test]
    fn zero_goal_is_always_zero(current in proptest::num::f64::ANY) {
        prop_assert_eq!(calculate_funding_progress(current, 0.0), 0.0);
    }
}
