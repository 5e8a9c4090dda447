//! Pearson correlation and autocorrelation

use crate::error::{StatsError, StatsResult};

/// Pearson correlation coefficient between two series, in `[-1, 1]`
///
/// Returns 0.0 when either series has zero variance.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> StatsResult<f64> {
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
    let mean_x: f64 = x.iter().sum::<f64>() / n_f;
    let mean_y: f64 = y.iter().sum::<f64>() / n_f;

    let cov: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
        .sum();
    let var_x: f64 = x.iter().map(|xi| (xi - mean_x) * (xi - mean_x)).sum();
    let var_y: f64 = y.iter().map(|yi| (yi - mean_y) * (yi - mean_y)).sum();

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return Ok(0.0);
    }

    Ok(cov / denom)
}

/// Autocorrelation of a series at a given lag
///
/// Returns 0.0 for a zero lag, a lag at or beyond the series length, fewer
/// than 2 points, or a zero-variance series.
pub fn autocorrelation(values: &[f64], lag: usize) -> f64 {
    let n = values.len();
    if lag == 0 || lag >= n || n < 2 {
        return 0.0;
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;
    if variance == 0.0 {
        return 0.0;
    }

    let cov: f64 = (0..n - lag)
        .map(|i| (values[i] - mean) * (values[i + lag] - mean))
        .sum::<f64>()
        / (n - lag) as f64;

    cov / variance
}
