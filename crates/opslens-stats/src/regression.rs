//! Ordinary least squares linear regression

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};

/// Result of fitting `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination in `[0, 1]` for well-formed input
    pub r_squared: f64,
}

/// Fit a simple linear regression via closed-form OLS sums
///
/// When all `x` values are identical the slope is undefined; the fit degrades
/// to `slope = 0`, `intercept = mean(y)`, `r_squared = 0` instead of dividing
/// by zero.
pub fn linear_regression(x: &[f64], y: &[f64]) -> StatsResult<LinearFit> {
    let n = x.len();
    if n != y.len() {
        return Err(StatsError::LengthMismatch {
            left: n,
            right: y.len(),
        });
    }
    if n < 2 {
        return Err(StatsError::TooFewPoints {
            required: 2,
            actual: n,
        });
    }

    let n_f = n as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(xi, yi)| xi * yi).sum();
    let sum_x2: f64 = x.iter().map(|xi| xi * xi).sum();

    let denom = n_f * sum_x2 - sum_x * sum_x;
    if denom == 0.0 {
        return Ok(LinearFit {
            slope: 0.0,
            intercept: sum_y / n_f,
            r_squared: 0.0,
        });
    }

    let slope = (n_f * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n_f;

    let y_mean = sum_y / n_f;
    let ss_tot: f64 = y.iter().map(|yi| (yi - y_mean) * (yi - y_mean)).sum();
    let ss_res: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| {
            let r = yi - (slope * xi + intercept);
            r * r
        })
        .sum();

    let r_squared = if ss_tot != 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        0.0
    };

    Ok(LinearFit {
        slope,
        intercept,
        r_squared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_line() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let fit = linear_regression(&x, &y).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_x_degrades_to_mean() {
        let x = [5.0, 5.0, 5.0];
        let y = [1.0, 2.0, 3.0];
        let fit = linear_regression(&x, &y).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert!((fit.intercept - 2.0).abs() < 1e-12);
        assert_eq!(fit.r_squared, 0.0);
    }

    #[test]
    fn constant_y_has_zero_r_squared() {
        let x = [1.0, 2.0, 3.0];
        let y = [4.0, 4.0, 4.0];
        let fit = linear_regression(&x, &y).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.r_squared, 0.0);
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let err = linear_regression(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert_eq!(err, StatsError::LengthMismatch { left: 2, right: 1 });
    }

    #[test]
    fn rejects_single_point() {
        let err = linear_regression(&[1.0], &[1.0]).unwrap_err();
        assert_eq!(
            err,
            StatsError::TooFewPoints {
                required: 2,
                actual: 1
            }
        );
    }
}
