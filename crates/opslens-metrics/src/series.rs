//! Row-major metric payloads to per-datapoint columnar series

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use opslens_core::types::normalize_epoch;
use opslens_core::{MetricQuery, MetricSeries, RawMetricData, ResourceSelector};

use crate::error::MetricsResult;

/// Transpose a raw value matrix into per-datapoint series
///
/// Filtering is independent per column: a "No Data" sentinel, null, or NaN in
/// one datapoint drops that row for that datapoint only, so different
/// datapoints may end up with different-length series. Values and timestamps
/// stay in lock-step within each series; a row without a parallel timestamp
/// is dropped entirely.
pub fn columnar_series(raw: &RawMetricData) -> BTreeMap<String, MetricSeries> {
    let timestamps: Vec<i64> = raw.timestamps.iter().map(|t| normalize_epoch(*t)).collect();

    let mut out = BTreeMap::new();
    for (dp_idx, dp_name) in raw.datapoint_names.iter().enumerate() {
        let mut series = MetricSeries::default();
        for (row_idx, row) in raw.values.iter().enumerate() {
            let Some(ts) = timestamps.get(row_idx) else {
                continue;
            };
            if let Some(value) = row.get(dp_idx).and_then(|cell| cell.as_sample()) {
                series.values.push(value);
                series.timestamps.push(*ts);
            }
        }
        out.insert(dp_name.clone(), series);
    }

    out
}

/// Fetches raw metric data and hands back normalized columnar series
#[derive(Clone)]
pub struct SeriesFetcher {
    metrics: Arc<dyn MetricQuery>,
}

impl SeriesFetcher {
    pub fn new(metrics: Arc<dyn MetricQuery>) -> Self {
        Self { metrics }
    }

    /// Fetch series for the trailing `hours_back` window
    pub async fn fetch_window(
        &self,
        resource: &ResourceSelector,
        datapoints: Option<&str>,
        hours_back: i64,
    ) -> MetricsResult<BTreeMap<String, MetricSeries>> {
        let now = Utc::now().timestamp();
        self.fetch_between(resource, datapoints, now - hours_back * 3600, now)
            .await
    }

    /// Fetch series for an explicit `[start, end]` window
    pub async fn fetch_between(
        &self,
        resource: &ResourceSelector,
        datapoints: Option<&str>,
        start: i64,
        end: i64,
    ) -> MetricsResult<BTreeMap<String, MetricSeries>> {
        let raw = self
            .metrics
            .fetch_raw(resource, datapoints, start, end)
            .await?;
        let series = columnar_series(&raw);
        debug!(
            device_id = resource.device_id,
            datapoints = series.len(),
            "fetched metric series"
        );
        Ok(series)
    }
}
