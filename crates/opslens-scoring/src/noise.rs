//! Alert-noise scoring
//!
//! Measures how noisy an alert stream is from three angles: how evenly the
//! alerts spread across datasource/datapoint combinations (entropy), how
//! often alerts re-fire shortly after clearing (flapping), and how many
//! combinations fire repeatedly.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use opslens_core::{AlertQuery, AlertRecord, Epoch};
use opslens_stats::shannon_entropy;

const FLAP_GAP_SECS: i64 = 1800;
const REPEAT_THRESHOLD: usize = 3;
const TOP_COMBOS: usize = 5;

const ENTROPY_WEIGHT: f64 = 40.0;
const FLAP_WEIGHT: f64 = 30.0;
const REPEAT_WEIGHT: f64 = 30.0;

const DEFAULT_FETCH_LIMIT: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseReport {
    pub total_alerts: usize,
    pub combo_count: usize,
    /// Entropy of the combo distribution, scaled to `[0, 1]`
    pub normalized_entropy: f64,
    /// Share of alerts that re-fired within 30 minutes of a prior clear
    pub flap_ratio: f64,
    /// Share of combos that fired three or more times
    pub repeat_ratio: f64,
    /// Composite noise score in `[0, 100]`, higher is noisier
    pub noise_score: u32,
    pub noisiest_combos: Vec<(String, usize)>,
    pub flapping_sources: Vec<String>,
    pub recommendations: Vec<String>,
}

fn combo_key(alert: &AlertRecord) -> String {
    format!("{}:{}", alert.datasource, alert.datapoint)
}

fn source_key(alert: &AlertRecord) -> String {
    format!("{}:{}", alert.device_name, alert.datapoint)
}

/// Score an alert batch without fetching anything
pub fn noise_report_for(alerts: &[AlertRecord]) -> NoiseReport {
    let mut combos: BTreeMap<String, usize> = BTreeMap::new();
    for alert in alerts {
        *combos.entry(combo_key(alert)).or_insert(0) += 1;
    }

    let total = alerts.len();
    let combo_count = combos.len();

    let probabilities: Vec<f64> = combos
        .values()
        .map(|count| *count as f64 / total.max(1) as f64)
        .collect();
    let normalized_entropy = if combo_count > 1 {
        shannon_entropy(&probabilities) / (combo_count as f64).log2()
    } else {
        0.0
    };

    // Flap sequences are per device and datapoint, not per combo; two
    // devices firing on the same datapoint must not interleave
    let mut sequences: BTreeMap<String, Vec<&AlertRecord>> = BTreeMap::new();
    for alert in alerts {
        sequences.entry(source_key(alert)).or_default().push(alert);
    }

    let mut flap_count = 0;
    let mut flapping_sources = Vec::new();
    for (key, members) in sequences.iter_mut() {
        members.sort_by_key(|a| a.start_epoch);
        let mut source_flaps = false;
        for pair in members.windows(2) {
            let (prev, curr) = (pair[0], pair[1]);
            if prev.end_epoch > 0 && curr.start_epoch - prev.end_epoch < FLAP_GAP_SECS {
                flap_count += 1;
                source_flaps = true;
            }
        }
        if source_flaps {
            flapping_sources.push(key.clone());
        }
    }
    flapping_sources.truncate(TOP_COMBOS);

    let repeat_count = combos
        .values()
        .filter(|count| **count >= REPEAT_THRESHOLD)
        .count();

    let flap_ratio = if total > 0 {
        flap_count as f64 / total as f64
    } else {
        0.0
    };
    let repeat_ratio = if combo_count > 0 {
        repeat_count as f64 / combo_count as f64
    } else {
        0.0
    };

    // Ratios are weighted as percentages, so any sustained flapping or
    // repetition saturates the score
    let noise_score = (normalized_entropy * ENTROPY_WEIGHT
        + flap_ratio * 100.0 * FLAP_WEIGHT
        + repeat_ratio * 100.0 * REPEAT_WEIGHT)
        .min(100.0) as u32;

    let mut noisiest_combos: Vec<(String, usize)> = combos
        .iter()
        .map(|(key, count)| (key.clone(), *count))
        .collect();
    noisiest_combos.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    noisiest_combos.truncate(TOP_COMBOS);

    let mut recommendations = Vec::new();
    if flap_ratio > 0.2 {
        recommendations
            .push("High flap ratio: lengthen clear intervals or add alert damping".to_string());
    }
    if repeat_ratio > 0.5 {
        recommendations.push(
            "Most combos fire repeatedly: revisit thresholds on the noisiest datasources"
                .to_string(),
        );
    }
    if combo_count > 1 && normalized_entropy < 0.3 {
        recommendations.push(
            "Alerts concentrate in a few combos: the top sources dominate the stream".to_string(),
        );
    }
    if recommendations.is_empty() && total > 0 {
        recommendations.push("Alert volume looks healthy".to_string());
    }

    NoiseReport {
        total_alerts: total,
        combo_count,
        normalized_entropy,
        flap_ratio,
        repeat_ratio,
        noise_score,
        noisiest_combos,
        flapping_sources,
        recommendations,
    }
}

/// Fetches recent alerts and scores their noise profile
#[derive(Clone)]
pub struct NoiseScorer {
    alerts: Arc<dyn AlertQuery>,
}

impl NoiseScorer {
    pub fn new(alerts: Arc<dyn AlertQuery>) -> Self {
        Self { alerts }
    }

    /// Score the trailing `hours_back` of alerts
    pub async fn score(&self, hours_back: i64) -> crate::error::ScoringResult<NoiseReport> {
        self.score_at(Utc::now().timestamp(), hours_back).await
    }

    pub async fn score_at(
        &self,
        now: Epoch,
        hours_back: i64,
    ) -> crate::error::ScoringResult<NoiseReport> {
        let alerts = self
            .alerts
            .alerts_since(now - hours_back * 3600, DEFAULT_FETCH_LIMIT)
            .await?;
        let report = noise_report_for(&alerts);
        debug!(
            alerts = report.total_alerts,
            score = report.noise_score,
            "noise scored"
        );
        Ok(report)
    }
}
