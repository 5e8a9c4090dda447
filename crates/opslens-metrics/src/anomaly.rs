//! Z-score anomaly detection over metric series

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use opslens_core::{Epoch, MetricQuery, MetricSeries, ResourceSelector};
use opslens_stats::{mean, sample_stddev};

use crate::error::MetricsResult;
use crate::series::SeriesFetcher;

/// Default z-score threshold for anomaly detection
pub const DEFAULT_Z_THRESHOLD: f64 = 2.0;

/// A sample that deviates significantly from its series distribution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricAnomaly {
    pub id: Uuid,
    pub datapoint: String,
    pub value: f64,
    pub timestamp: Epoch,
    pub z_score: f64,
    pub mean: f64,
    pub stddev: f64,
}

/// Anomaly scan result for one resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub resource: ResourceSelector,
    pub total_datapoints_checked: usize,
    pub anomaly_count: usize,
    pub anomalies: Vec<MetricAnomaly>,
    pub threshold: f64,
    pub hours_back: i64,
}

/// Flag samples whose z-score against the series distribution exceeds the
/// threshold
///
/// Series with fewer than 2 samples or zero dispersion (constant data) can
/// produce no anomalies.
pub fn detect_anomalies(
    datapoint: &str,
    series: &MetricSeries,
    threshold: f64,
) -> Vec<MetricAnomaly> {
    if series.len() < 2 {
        return Vec::new();
    }

    let m = mean(&series.values);
    let stddev = sample_stddev(&series.values);
    if stddev == 0.0 {
        return Vec::new();
    }

    series
        .values
        .iter()
        .zip(&series.timestamps)
        .filter_map(|(value, ts)| {
            let z_score = (value - m).abs() / stddev;
            if z_score > threshold {
                Some(MetricAnomaly {
                    id: Uuid::new_v4(),
                    datapoint: datapoint.to_string(),
                    value: *value,
                    timestamp: *ts,
                    z_score,
                    mean: m,
                    stddev,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Scans a resource's metric series for statistical outliers
pub struct AnomalyScanner {
    fetcher: SeriesFetcher,
}

impl AnomalyScanner {
    pub fn new(metrics: Arc<dyn MetricQuery>) -> Self {
        Self {
            fetcher: SeriesFetcher::new(metrics),
        }
    }

    /// Fetch the trailing window and flag anomalous samples per datapoint
    pub async fn scan(
        &self,
        resource: &ResourceSelector,
        datapoints: Option<&str>,
        hours_back: i64,
        threshold: f64,
    ) -> MetricsResult<AnomalyReport> {
        let series_map = self
            .fetcher
            .fetch_window(resource, datapoints, hours_back)
            .await?;

        let total_datapoints_checked = series_map.len();
        let mut anomalies = Vec::new();
        for (dp_name, series) in &series_map {
            anomalies.extend(detect_anomalies(dp_name, series, threshold));
        }

        debug!(
            device_id = resource.device_id,
            anomalies = anomalies.len(),
            "anomaly scan complete"
        );

        Ok(AnomalyReport {
            resource: *resource,
            total_datapoints_checked,
            anomaly_count: anomalies.len(),
            anomalies,
            threshold,
            hours_back,
        })
    }
}
