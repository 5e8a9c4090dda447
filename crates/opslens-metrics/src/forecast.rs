//! Threshold breach forecasting and changepoint mapping

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use opslens_core::{Epoch, MetricQuery, MetricSeries, ResourceSelector};
use opslens_stats::{cusum, linear_regression, Direction};

use crate::error::MetricsResult;
use crate::series::SeriesFetcher;

/// Slopes smaller than this count as flat
const FLAT_SLOPE: f64 = 1e-10;

/// Direction of a fitted linear trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Stable,
    Increasing,
    Decreasing,
}

/// Per-datapoint breach forecast
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DatapointForecast {
    /// Fewer than 2 samples; nothing to fit
    InsufficientData { sample_count: usize },
    /// A linear trend was fitted
    Projected {
        current_value: f64,
        threshold: f64,
        trend: Trend,
        slope_per_hour: f64,
        intercept: f64,
        r_squared: f64,
        /// Days until the threshold is crossed, only when that lies ahead
        days_until_breach: Option<f64>,
        /// Predicted breach time, only when the breach lies ahead
        predicted_breach_epoch: Option<Epoch>,
        sample_count: usize,
    },
}

/// Breach forecast across a resource's datapoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreachForecastReport {
    pub resource: ResourceSelector,
    pub hours_back: i64,
    pub forecasts: BTreeMap<String, DatapointForecast>,
}

/// A CUSUM changepoint mapped back to its sample timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedChangePoint {
    /// Timestamp of the sample at the changepoint index
    pub timestamp: Option<Epoch>,
    pub direction: Direction,
    pub magnitude: f64,
    pub index: usize,
}

/// Changepoints for a single datapoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatapointChangePoints {
    pub change_point_count: usize,
    pub change_points: Vec<TimedChangePoint>,
    pub sample_count: usize,
}

/// Changepoint scan across a resource's datapoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePointReport {
    pub resource: ResourceSelector,
    pub hours_back: i64,
    pub sensitivity: f64,
    pub total_change_points: usize,
    pub datapoints: BTreeMap<String, DatapointChangePoints>,
}

/// Fit a linear trend and project when `threshold` will be breached
pub fn forecast_datapoint(series: &MetricSeries, threshold: f64) -> DatapointForecast {
    if series.len() < 2 {
        return DatapointForecast::InsufficientData {
            sample_count: series.len(),
        };
    }

    // Regress value against hours since the first sample
    let t0 = series.timestamps[0];
    let x_hours: Vec<f64> = series
        .timestamps
        .iter()
        .map(|t| (t - t0) as f64 / 3600.0)
        .collect();

    let Ok(fit) = linear_regression(&x_hours, &series.values) else {
        return DatapointForecast::InsufficientData {
            sample_count: series.len(),
        };
    };

    let current_value = series.values[series.len() - 1];

    let trend = if fit.slope.abs() < FLAT_SLOPE {
        Trend::Stable
    } else if fit.slope > 0.0 {
        Trend::Increasing
    } else {
        Trend::Decreasing
    };

    let mut days_until_breach = None;
    let mut predicted_breach_epoch = None;
    if fit.slope != 0.0 {
        let hours_to_breach = (threshold - fit.intercept) / fit.slope;
        let current_hours = (series.timestamps[series.len() - 1] - t0) as f64 / 3600.0;
        let remaining_hours = hours_to_breach - current_hours;
        if remaining_hours > 0.0 {
            days_until_breach = Some(remaining_hours / 24.0);
            predicted_breach_epoch = Some(
                series.timestamps[series.len() - 1] + (remaining_hours * 3600.0) as Epoch,
            );
        }
    }

    DatapointForecast::Projected {
        current_value,
        threshold,
        trend,
        slope_per_hour: fit.slope,
        intercept: fit.intercept,
        r_squared: fit.r_squared,
        days_until_breach,
        predicted_breach_epoch,
        sample_count: series.len(),
    }
}

/// Run CUSUM over a series and map indices back to timestamps
pub fn timed_change_points(series: &MetricSeries, sensitivity: f64) -> Vec<TimedChangePoint> {
    cusum(&series.values, None, sensitivity)
        .into_iter()
        .map(|cp| TimedChangePoint {
            timestamp: series.timestamps.get(cp.index).copied(),
            direction: cp.direction,
            magnitude: cp.magnitude,
            index: cp.index,
        })
        .collect()
}

/// Fetches series and produces forecasts and changepoint scans
pub struct ForecastEngine {
    fetcher: SeriesFetcher,
}

impl ForecastEngine {
    pub fn new(metrics: Arc<dyn MetricQuery>) -> Self {
        Self {
            fetcher: SeriesFetcher::new(metrics),
        }
    }

    /// Forecast when each datapoint will breach `threshold` on its current
    /// linear trend
    pub async fn forecast_breach(
        &self,
        resource: &ResourceSelector,
        threshold: f64,
        datapoints: Option<&str>,
        hours_back: i64,
    ) -> MetricsResult<BreachForecastReport> {
        let series_map = self
            .fetcher
            .fetch_window(resource, datapoints, hours_back)
            .await?;

        let forecasts = series_map
            .iter()
            .map(|(name, series)| (name.clone(), forecast_datapoint(series, threshold)))
            .collect();

        Ok(BreachForecastReport {
            resource: *resource,
            hours_back,
            forecasts,
        })
    }

    /// Detect regime shifts per datapoint using CUSUM
    pub async fn detect_change_points(
        &self,
        resource: &ResourceSelector,
        datapoints: Option<&str>,
        hours_back: i64,
        sensitivity: f64,
    ) -> MetricsResult<ChangePointReport> {
        let series_map = self
            .fetcher
            .fetch_window(resource, datapoints, hours_back)
            .await?;

        let mut total_change_points = 0;
        let mut results = BTreeMap::new();
        for (dp_name, series) in &series_map {
            let change_points = timed_change_points(series, sensitivity);
            total_change_points += change_points.len();
            results.insert(
                dp_name.clone(),
                DatapointChangePoints {
                    change_point_count: change_points.len(),
                    change_points,
                    sample_count: series.len(),
                },
            );
        }

        debug!(
            device_id = resource.device_id,
            total_change_points, "changepoint scan complete"
        );

        Ok(ChangePointReport {
            resource: *resource,
            hours_back,
            sensitivity,
            total_change_points,
            datapoints: results,
        })
    }
}
