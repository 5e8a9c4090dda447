//! Property-based tests for the statistics primitives
//!
//! Checks the invariants the analytics engines rely on: regression matches
//! the analytic OLS solution, correlation stays in range, degenerate inputs
//! return neutral values instead of NaN.

use proptest::prelude::*;

use opslens_stats::{
    coefficient_of_variation, cusum, linear_regression, pearson_correlation, shannon_entropy,
};

/// Strategy for a series of finite values of moderate magnitude
fn value_series(min_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1e6f64..1e6f64, min_len..64)
}

proptest! {
    /// Regression on an exact line recovers slope and intercept
    #[test]
    fn prop_regression_recovers_exact_line(
        slope in -100.0f64..100.0,
        intercept in -100.0f64..100.0,
        n in 2usize..32,
    ) {
        let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|xi| slope * xi + intercept).collect();

        let fit = linear_regression(&x, &y).unwrap();
        prop_assert!((fit.slope - slope).abs() < 1e-6);
        prop_assert!((fit.intercept - intercept).abs() < 1e-4);
    }

    /// R-squared stays within [0, 1] for distinct x values
    #[test]
    fn prop_r_squared_in_unit_interval(ys in value_series(2)) {
        let x: Vec<f64> = (0..ys.len()).map(|i| i as f64).collect();
        let fit = linear_regression(&x, &ys).unwrap();
        prop_assert!(fit.r_squared >= -1e-9);
        prop_assert!(fit.r_squared <= 1.0 + 1e-9);
    }

    /// Constant x never panics or divides by zero
    #[test]
    fn prop_constant_x_is_safe(c in -1e6f64..1e6, ys in value_series(2)) {
        let x = vec![c; ys.len()];
        let fit = linear_regression(&x, &ys).unwrap();
        prop_assert_eq!(fit.slope, 0.0);
        prop_assert!(fit.intercept.is_finite());
    }

    /// Pearson correlation is always within [-1, 1]
    #[test]
    fn prop_pearson_bounded(xs in value_series(2)) {
        let ys: Vec<f64> = xs.iter().rev().cloned().collect();
        let r = pearson_correlation(&xs, &ys).unwrap();
        prop_assert!(r >= -1.0 - 1e-9);
        prop_assert!(r <= 1.0 + 1e-9);
    }

    /// A series correlates with itself at 1 unless it is constant
    #[test]
    fn prop_self_correlation(xs in value_series(2)) {
        let r = pearson_correlation(&xs, &xs).unwrap();
        let constant = xs.iter().all(|v| *v == xs[0]);
        if constant {
            prop_assert_eq!(r, 0.0);
        } else {
            prop_assert!((r - 1.0).abs() < 1e-6);
        }
    }

    /// CUSUM never reports an index outside the series
    #[test]
    fn prop_cusum_indices_in_bounds(values in value_series(4), sensitivity in 0.25f64..4.0) {
        let points = cusum(&values, None, sensitivity);
        for p in points {
            prop_assert!(p.index < values.len());
            prop_assert!(p.magnitude.is_finite());
        }
    }

    /// Entropy of a normalized distribution is bounded by log2(n)
    #[test]
    fn prop_entropy_bounded(raw in prop::collection::vec(0.01f64..10.0, 2..32)) {
        let total: f64 = raw.iter().sum();
        let probs: Vec<f64> = raw.iter().map(|v| v / total).collect();
        let h = shannon_entropy(&probs);
        prop_assert!(h >= 0.0);
        prop_assert!(h <= (probs.len() as f64).log2() + 1e-9);
    }

    /// Coefficient of variation is never negative and never NaN
    #[test]
    fn prop_cv_non_negative(values in value_series(0)) {
        let cv = coefficient_of_variation(&values);
        prop_assert!(cv >= 0.0);
        prop_assert!(cv.is_finite());
    }
}
