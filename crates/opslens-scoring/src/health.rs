//! Device health from latest-sample deviation
//!
//! Each datapoint's most recent sample is scored as a z-score against its
//! window, optionally weighted per datapoint; the averaged weighted
//! deviation maps onto a 0-100 health score.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use opslens_core::{Epoch, ResourceSelector};
use opslens_metrics::SeriesFetcher;
use opslens_stats::{mean, sample_stddev};

const Z_SCORE_PENALTY: f64 = 15.0;
const HEALTHY_FLOOR: f64 = 80.0;
const DEGRADED_FLOOR: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Critical,
    /// No datapoint had enough samples to judge
    Unknown,
}

/// One datapoint's contribution to the health score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatapointFactor {
    pub datapoint: String,
    pub latest_value: f64,
    pub mean: f64,
    pub stddev: f64,
    pub z_score: f64,
    pub weight: f64,
    pub weighted_impact: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub health_score: f64,
    pub status: HealthStatus,
    /// Contributing datapoints, heaviest weighted impact first
    pub factors: Vec<DatapointFactor>,
}

/// Scores a resource's current health against its own recent history
#[derive(Clone)]
pub struct HealthScorer {
    fetcher: SeriesFetcher,
}

impl HealthScorer {
    pub fn new(fetcher: SeriesFetcher) -> Self {
        Self { fetcher }
    }

    /// Score health over the trailing `hours_back` window
    ///
    /// `weights` scales each datapoint's deviation; unlisted datapoints
    /// weigh 1.0.
    pub async fn score(
        &self,
        resource: &ResourceSelector,
        datapoints: Option<&str>,
        hours_back: i64,
        weights: Option<&BTreeMap<String, f64>>,
    ) -> crate::error::ScoringResult<HealthReport> {
        self.score_at(Utc::now().timestamp(), resource, datapoints, hours_back, weights)
            .await
    }

    pub async fn score_at(
        &self,
        now: Epoch,
        resource: &ResourceSelector,
        datapoints: Option<&str>,
        hours_back: i64,
        weights: Option<&BTreeMap<String, f64>>,
    ) -> crate::error::ScoringResult<HealthReport> {
        let series = self
            .fetcher
            .fetch_between(resource, datapoints, now - hours_back * 3600, now)
            .await?;

        let mut factors = Vec::new();
        for (dp_name, dp_series) in &series {
            if dp_series.len() < 2 {
                continue;
            }
            let latest = dp_series.values[dp_series.len() - 1];
            let window_mean = mean(&dp_series.values);
            let window_stddev = sample_stddev(&dp_series.values);
            let z_score = if window_stddev > 0.0 {
                (latest - window_mean).abs() / window_stddev
            } else {
                0.0
            };
            let weight = weights
                .and_then(|w| w.get(dp_name).copied())
                .unwrap_or(1.0);
            factors.push(DatapointFactor {
                datapoint: dp_name.clone(),
                latest_value: latest,
                mean: window_mean,
                stddev: window_stddev,
                z_score,
                weight,
                weighted_impact: z_score * weight,
            });
        }

        let report = if factors.is_empty() {
            HealthReport {
                health_score: 0.0,
                status: HealthStatus::Unknown,
                factors,
            }
        } else {
            let avg_weighted_z = factors.iter().map(|f| f.weighted_impact).sum::<f64>()
                / factors.len() as f64;
            let health_score = (100.0 - avg_weighted_z * Z_SCORE_PENALTY).max(0.0);
            let status = if health_score >= HEALTHY_FLOOR {
                HealthStatus::Healthy
            } else if health_score >= DEGRADED_FLOOR {
                HealthStatus::Degraded
            } else {
                HealthStatus::Critical
            };
            factors.sort_by(|a, b| {
                b.weighted_impact
                    .total_cmp(&a.weighted_impact)
                    .then_with(|| a.datapoint.cmp(&b.datapoint))
            });
            HealthReport {
                health_score,
                status,
                factors,
            }
        };

        debug!(
            device_id = resource.device_id,
            score = report.health_score,
            "health scored"
        );
        Ok(report)
    }
}
