//! CUSUM changepoint detection

use serde::{Deserialize, Serialize};

/// Direction of a detected mean shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increase,
    Decrease,
}

/// A point where the cumulative deviation from the target crossed threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChangePoint {
    /// Index into the input series
    pub index: usize,
    pub direction: Direction,
    /// Value of the running sum at the moment it fired
    pub magnitude: f64,
}

/// Two-sided cumulative-sum changepoint detector
///
/// `target` defaults to the series mean. The detection threshold is
/// `sensitivity * stddev * 2` where stddev is the population dispersion
/// around the target; each step applies a drift correction of half a stddev
/// to both running sums. A running sum that crosses the threshold emits a
/// changepoint and resets to zero; the positive and negative sums are
/// independent and can both fire at the same index.
///
/// Returns an empty list for fewer than 4 points or zero dispersion.
pub fn cusum(values: &[f64], target: Option<f64>, sensitivity: f64) -> Vec<ChangePoint> {
    if values.len() < 4 {
        return Vec::new();
    }

    let target = target.unwrap_or_else(|| values.iter().sum::<f64>() / values.len() as f64);

    let variance =
        values.iter().map(|v| (v - target) * (v - target)).sum::<f64>() / values.len() as f64;
    if variance <= 0.0 {
        return Vec::new();
    }
    let stddev = variance.sqrt();

    let threshold = sensitivity * stddev * 2.0;
    let drift = stddev * 0.5;

    let mut s_pos = 0.0f64;
    let mut s_neg = 0.0f64;
    let mut change_points = Vec::new();

    for (i, value) in values.iter().enumerate() {
        let deviation = value - target;
        s_pos = (s_pos + deviation - drift).max(0.0);
        s_neg = (s_neg - deviation - drift).max(0.0);

        if s_pos > threshold {
            change_points.push(ChangePoint {
                index: i,
                direction: Direction::Increase,
                magnitude: s_pos,
            });
            s_pos = 0.0;
        }

        if s_neg > threshold {
            change_points.push(ChangePoint {
                index: i,
                direction: Direction::Decrease,
                magnitude: s_neg,
            });
            s_neg = 0.0;
        }
    }

    change_points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_series_has_no_changepoints() {
        assert!(cusum(&[5.0; 20], None, 1.0).is_empty());
    }

    #[test]
    fn short_series_has_no_changepoints() {
        assert!(cusum(&[1.0, 9.0, 1.0], None, 1.0).is_empty());
    }

    #[test]
    fn level_shift_fires_increase() {
        let mut values = vec![1.0; 20];
        values.extend(vec![10.0; 20]);
        let points = cusum(&values, None, 1.0);
        assert!(!points.is_empty());
        assert!(points.iter().any(|p| p.direction == Direction::Increase));
        // The first detection lands after the shift at index 20
        assert!(points[0].index >= 20);
    }

    #[test]
    fn downward_shift_fires_decrease() {
        let mut values = vec![10.0; 20];
        values.extend(vec![1.0; 20]);
        let points = cusum(&values, None, 1.0);
        assert!(points.iter().any(|p| p.direction == Direction::Decrease));
    }

    #[test]
    fn explicit_target_shifts_detection() {
        // Around a target of 0, a constant positive series drifts up steadily
        let values = vec![3.0; 10];
        let points = cusum(&values, Some(0.0), 1.0);
        assert!(!points.is_empty());
        assert!(points.iter().all(|p| p.direction == Direction::Increase));
    }

    #[test]
    fn higher_sensitivity_detects_fewer_points() {
        let mut values = vec![1.0; 15];
        values.extend(vec![4.0; 15]);
        let loose = cusum(&values, None, 1.0).len();
        let strict = cusum(&values, None, 3.0).len();
        assert!(strict <= loose);
    }
}
