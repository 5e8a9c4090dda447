//! Saving and comparing against named performance baselines

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use opslens_core::{Epoch, ResourceSelector, VariableStore};
use opslens_metrics::SeriesFetcher;
use opslens_stats::{mean, sample_stddev};

use crate::baseline::{
    classify_deviation, Baseline, BaselineSaved, ComparisonReport, DatapointComparison,
    DatapointStats, DeviationStatus, ResourceOverrides,
};
use crate::error::{BaselineError, BaselineResult};

fn storage_key(name: &str) -> String {
    format!("baseline_{name}")
}

/// Persists baselines through a [`VariableStore`] and compares fresh metric
/// windows against them
#[derive(Clone)]
pub struct BaselineManager {
    store: Arc<dyn VariableStore>,
    fetcher: SeriesFetcher,
}

impl BaselineManager {
    pub fn new(store: Arc<dyn VariableStore>, fetcher: SeriesFetcher) -> Self {
        Self { store, fetcher }
    }

    /// Save a baseline from the trailing `window_hours` of data
    ///
    /// Overwrites any baseline already stored under `name`.
    pub async fn save_baseline(
        &self,
        resource: ResourceSelector,
        name: &str,
        datapoints: Option<&str>,
        window_hours: i64,
    ) -> BaselineResult<BaselineSaved> {
        self.save_baseline_at(Utc::now().timestamp(), resource, name, datapoints, window_hours)
            .await
    }

    /// Save a baseline with an explicit reference time
    pub async fn save_baseline_at(
        &self,
        now: Epoch,
        resource: ResourceSelector,
        name: &str,
        datapoints: Option<&str>,
        window_hours: i64,
    ) -> BaselineResult<BaselineSaved> {
        let series = self
            .fetcher
            .fetch_between(&resource, datapoints, now - window_hours * 3600, now)
            .await?;

        let mut stats = BTreeMap::new();
        for (dp_name, dp_series) in &series {
            let entry = if dp_series.is_empty() {
                DatapointStats::unavailable()
            } else {
                let values = &dp_series.values;
                DatapointStats {
                    mean: Some(mean(values)),
                    min: values.iter().copied().reduce(f64::min),
                    max: values.iter().copied().reduce(f64::max),
                    stddev: Some(sample_stddev(values)),
                    sample_count: values.len(),
                }
            };
            stats.insert(dp_name.clone(), entry);
        }

        let baseline = Baseline {
            resource,
            datapoints: stats.clone(),
            window_hours,
            created_at: now,
        };
        self.store
            .set(&storage_key(name), serde_json::to_value(&baseline)?)
            .await?;
        info!(
            baseline = name,
            device_id = resource.device_id,
            datapoints = stats.len(),
            window_hours,
            "saved baseline"
        );

        Ok(BaselineSaved {
            baseline_name: name.to_string(),
            resource,
            window_hours,
            datapoints: stats,
        })
    }

    /// Compare the trailing `hours_back` of data against a saved baseline
    pub async fn compare_to_baseline(
        &self,
        name: &str,
        overrides: ResourceOverrides,
        hours_back: i64,
    ) -> BaselineResult<ComparisonReport> {
        self.compare_to_baseline_at(Utc::now().timestamp(), name, overrides, hours_back)
            .await
    }

    /// Compare against a saved baseline with an explicit reference time
    pub async fn compare_to_baseline_at(
        &self,
        now: Epoch,
        name: &str,
        overrides: ResourceOverrides,
        hours_back: i64,
    ) -> BaselineResult<ComparisonReport> {
        let stored = self
            .store
            .get(&storage_key(name))
            .await?
            .ok_or_else(|| BaselineError::NotFound(name.to_string()))?;
        let baseline: Baseline = serde_json::from_value(stored)?;

        let resource = overrides.apply(baseline.resource);
        let series = self
            .fetcher
            .fetch_between(&resource, None, now - hours_back * 3600, now)
            .await?;

        // Walk the fresh fetch; datapoints the fetch no longer declares are
        // omitted, and names the baseline never saw are skipped silently
        let mut comparisons = BTreeMap::new();
        for (dp_name, current_series) in &series {
            let Some(baseline_mean) = baseline.datapoints.get(dp_name).and_then(|s| s.mean)
            else {
                continue;
            };

            let comparison = if current_series.is_empty() {
                DatapointComparison {
                    status: DeviationStatus::NoData,
                    baseline_mean,
                    current_mean: None,
                    deviation_percent: None,
                }
            } else {
                let current_mean = mean(&current_series.values);
                let deviation_pct = if baseline_mean == 0.0 {
                    if current_mean == 0.0 {
                        0.0
                    } else {
                        f64::INFINITY
                    }
                } else {
                    ((current_mean - baseline_mean) / baseline_mean).abs() * 100.0
                };
                DatapointComparison {
                    status: classify_deviation(deviation_pct, current_mean, baseline_mean),
                    baseline_mean,
                    current_mean: Some(current_mean),
                    deviation_percent: deviation_pct.is_finite().then_some(deviation_pct),
                }
            };
            comparisons.insert(dp_name.clone(), comparison);
        }

        debug!(
            baseline = name,
            compared = comparisons.len(),
            "compared against baseline"
        );
        Ok(ComparisonReport {
            baseline_name: name.to_string(),
            comparisons,
            hours_compared: hours_back,
        })
    }
}
