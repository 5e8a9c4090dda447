//! Spike detection and change matching

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use opslens_core::types::normalize_epoch;
use opslens_core::{AlertQuery, AlertRecord, AuditQuery, ChangeRecord, Epoch};
use opslens_stats::{mean, sample_stddev};

use crate::clusters::{cluster_alerts, ClusterReport};
use crate::config::CorrelationConfig;
use crate::error::CorrelationResult;
use crate::statistics::{alert_statistics, AlertStatisticsReport};

/// Fixed-width alert-count bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBucket {
    pub bucket_start: Epoch,
    pub alert_count: usize,
}

/// Change event reduced to the fields the report carries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub id: u64,
    pub timestamp: Epoch,
    pub username: String,
    pub description: String,
}

impl ChangeSummary {
    fn from_record(record: &ChangeRecord) -> Self {
        Self {
            id: record.id,
            timestamp: normalize_epoch(record.happened_on),
            username: record.username.clone(),
            description: record.description.clone(),
        }
    }
}

/// A change temporally matched to an alert spike
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelatedEvent {
    pub change: ChangeSummary,
    pub spike: TimeBucket,
    pub time_gap_minutes: f64,
    /// Linear decay from 1.0 at zero gap to 0.5 at the window edge
    pub confidence: f64,
}

/// Full correlation report for one lookback window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub total_alerts: usize,
    pub total_changes: usize,
    pub total_spikes: usize,
    pub correlated_events: Vec<CorrelatedEvent>,
    pub uncorrelated_changes: Vec<ChangeSummary>,
    pub uncorrelated_spikes: Vec<TimeBucket>,
}

/// Count alert start-times into fixed-width buckets, ascending by start
pub fn bucket_alerts(alerts: &[AlertRecord], bucket_size_secs: i64) -> Vec<TimeBucket> {
    let mut counts: BTreeMap<Epoch, usize> = BTreeMap::new();
    for alert in alerts {
        let start = normalize_epoch(alert.start_epoch);
        let bucket = (start / bucket_size_secs) * bucket_size_secs;
        *counts.entry(bucket).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(bucket_start, alert_count)| TimeBucket {
            bucket_start,
            alert_count,
        })
        .collect()
}

/// Flag buckets whose count exceeds `mean + sample_stddev` of all counts
///
/// A bucket holding a single alert is never a spike regardless of the
/// threshold.
pub fn detect_spikes(buckets: &[TimeBucket]) -> Vec<TimeBucket> {
    let counts: Vec<f64> = buckets.iter().map(|b| b.alert_count as f64).collect();
    let threshold = mean(&counts) + sample_stddev(&counts);
    buckets
        .iter()
        .filter(|b| b.alert_count as f64 > threshold && b.alert_count > 1)
        .copied()
        .collect()
}

/// Match each change to the first spike within `window_seconds` after it
///
/// A change matches at most once; a spike may be matched by several changes
/// because each change scans independently. Returns the matches plus the
/// leftover changes and spikes.
pub fn match_changes(
    changes: &[ChangeRecord],
    spikes: &[TimeBucket],
    window_seconds: i64,
) -> (Vec<CorrelatedEvent>, Vec<ChangeSummary>, Vec<TimeBucket>) {
    let mut correlated = Vec::new();
    let mut uncorrelated_changes = Vec::new();
    let mut matched_spikes: HashSet<Epoch> = HashSet::new();

    for change in changes {
        let change_time = normalize_epoch(change.happened_on);
        let hit = spikes.iter().find(|spike| {
            let gap = spike.bucket_start - change_time;
            gap >= 0 && gap <= window_seconds
        });
        match hit {
            Some(spike) => {
                let gap_secs = (spike.bucket_start - change_time) as f64;
                matched_spikes.insert(spike.bucket_start);
                correlated.push(CorrelatedEvent {
                    change: ChangeSummary::from_record(change),
                    spike: *spike,
                    time_gap_minutes: gap_secs / 60.0,
                    confidence: (1.0 - 0.5 * gap_secs / window_seconds as f64).max(0.5),
                });
            }
            None => uncorrelated_changes.push(ChangeSummary::from_record(change)),
        }
    }

    let uncorrelated_spikes = spikes
        .iter()
        .filter(|s| !matched_spikes.contains(&s.bucket_start))
        .copied()
        .collect();

    (correlated, uncorrelated_changes, uncorrelated_spikes)
}

/// Correlates alert spikes with configuration changes
#[derive(Clone)]
pub struct ChangeCorrelationEngine {
    alerts: Arc<dyn AlertQuery>,
    audits: Arc<dyn AuditQuery>,
    config: CorrelationConfig,
}

impl ChangeCorrelationEngine {
    pub fn new(alerts: Arc<dyn AlertQuery>, audits: Arc<dyn AuditQuery>) -> Self {
        Self::with_config(alerts, audits, CorrelationConfig::default())
    }

    pub fn with_config(
        alerts: Arc<dyn AlertQuery>,
        audits: Arc<dyn AuditQuery>,
        config: CorrelationConfig,
    ) -> Self {
        Self {
            alerts,
            audits,
            config,
        }
    }

    /// Correlate over the trailing `hours_back` window
    pub async fn correlate(
        &self,
        hours_back: i64,
        correlation_window_minutes: i64,
    ) -> CorrelationResult<CorrelationReport> {
        self.correlate_at(Utc::now().timestamp(), hours_back, correlation_window_minutes)
            .await
    }

    /// Correlate with an explicit reference time
    ///
    /// Alert fetch failure aborts the call; audit fetch failure degrades to
    /// an empty change list.
    pub async fn correlate_at(
        &self,
        now: Epoch,
        hours_back: i64,
        correlation_window_minutes: i64,
    ) -> CorrelationResult<CorrelationReport> {
        let start = now - hours_back * 3600;

        let alerts = self
            .alerts
            .alerts_since(start, self.config.alert_fetch_limit)
            .await?;
        let changes = match self
            .audits
            .changes_since(start, self.config.change_fetch_limit)
            .await
        {
            Ok(changes) => changes,
            Err(err) => {
                warn!(error = %err, "audit fetch failed, correlating without changes");
                Vec::new()
            }
        };

        let buckets = bucket_alerts(&alerts, self.config.bucket_size_secs);
        let spikes = detect_spikes(&buckets);
        let window_seconds = correlation_window_minutes * 60;
        let (correlated, mut uncorrelated_changes, mut uncorrelated_spikes) =
            match_changes(&changes, &spikes, window_seconds);

        uncorrelated_changes.truncate(self.config.uncorrelated_change_cap);
        uncorrelated_changes.truncate(self.config.report_item_cap);
        uncorrelated_spikes.truncate(self.config.report_item_cap);

        debug!(
            alerts = alerts.len(),
            changes = changes.len(),
            spikes = spikes.len(),
            correlated = correlated.len(),
            "correlation complete"
        );
        Ok(CorrelationReport {
            total_alerts: alerts.len(),
            total_changes: changes.len(),
            total_spikes: spikes.len(),
            correlated_events: correlated,
            uncorrelated_changes,
            uncorrelated_spikes,
        })
    }

    /// Cluster recent alerts by device, datasource, and time proximity
    pub async fn cluster_recent(&self, hours_back: i64) -> CorrelationResult<ClusterReport> {
        self.cluster_recent_at(Utc::now().timestamp(), hours_back)
            .await
    }

    pub async fn cluster_recent_at(
        &self,
        now: Epoch,
        hours_back: i64,
    ) -> CorrelationResult<ClusterReport> {
        let alerts = self
            .alerts
            .alerts_since(now - hours_back * 3600, self.config.alert_fetch_limit)
            .await?;
        Ok(cluster_alerts(&alerts, self.config.bucket_size_secs))
    }

    /// Summarize recent alerts by severity, source, and hour of day
    pub async fn recent_statistics(
        &self,
        hours_back: i64,
    ) -> CorrelationResult<AlertStatisticsReport> {
        self.recent_statistics_at(Utc::now().timestamp(), hours_back)
            .await
    }

    pub async fn recent_statistics_at(
        &self,
        now: Epoch,
        hours_back: i64,
    ) -> CorrelationResult<AlertStatisticsReport> {
        let alerts = self
            .alerts
            .alerts_since(now - hours_back * 3600, self.config.alert_fetch_limit)
            .await?;
        Ok(alert_statistics(&alerts))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use opslens_core::{ProviderError, ProviderResult};

    use super::*;

    fn alert(id: &str, start: Epoch) -> AlertRecord {
        AlertRecord {
            id: id.to_string(),
            severity: 3,
            start_epoch: start,
            end_epoch: 0,
            device_name: "core-sw-01".to_string(),
            datasource: "Ping".to_string(),
            datapoint: "PingLossPercent".to_string(),
            cleared: false,
        }
    }

    fn change(id: u64, happened_on: i64) -> ChangeRecord {
        ChangeRecord {
            id,
            happened_on,
            username: "netops".to_string(),
            description: "updated ACL".to_string(),
        }
    }

    #[test]
    fn buckets_count_alerts_per_window() {
        let alerts = vec![alert("a", 100), alert("b", 250), alert("c", 300)];
        let buckets = bucket_alerts(&alerts, 300);
        assert_eq!(
            buckets,
            vec![
                TimeBucket {
                    bucket_start: 0,
                    alert_count: 2
                },
                TimeBucket {
                    bucket_start: 300,
                    alert_count: 1
                },
            ]
        );
    }

    #[test]
    fn single_tall_bucket_is_the_only_spike() {
        let mut buckets: Vec<TimeBucket> = (0..20)
            .map(|i| TimeBucket {
                bucket_start: i * 300,
                alert_count: 1,
            })
            .collect();
        buckets.push(TimeBucket {
            bucket_start: 6000,
            alert_count: 10,
        });

        let spikes = detect_spikes(&buckets);
        assert_eq!(spikes.len(), 1);
        assert_eq!(spikes[0].bucket_start, 6000);
        assert_eq!(spikes[0].alert_count, 10);
    }

    #[test]
    fn lone_alert_bucket_is_never_a_spike() {
        let buckets = vec![
            TimeBucket {
                bucket_start: 0,
                alert_count: 0,
            },
            TimeBucket {
                bucket_start: 300,
                alert_count: 1,
            },
        ];
        assert!(detect_spikes(&buckets).is_empty());
    }

    #[test]
    fn match_confidence_decays_linearly() {
        let changes = vec![change(1, 1000)];
        let spikes = vec![TimeBucket {
            bucket_start: 1100,
            alert_count: 5,
        }];

        let (correlated, leftover_changes, leftover_spikes) =
            match_changes(&changes, &spikes, 600);
        assert_eq!(correlated.len(), 1);
        assert!(leftover_changes.is_empty());
        assert!(leftover_spikes.is_empty());

        let event = &correlated[0];
        assert!((event.time_gap_minutes - 100.0 / 60.0).abs() < 1e-9);
        assert!((event.confidence - (1.0 - 0.5 * 100.0 / 600.0)).abs() < 1e-9);
    }

    #[test]
    fn confidence_floors_at_half() {
        let changes = vec![change(1, 1000)];
        let spikes = vec![TimeBucket {
            bucket_start: 1600,
            alert_count: 5,
        }];

        let (correlated, _, _) = match_changes(&changes, &spikes, 600);
        assert!((correlated[0].confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn first_spike_in_window_wins() {
        let changes = vec![change(1, 1000)];
        let spikes = vec![
            TimeBucket {
                bucket_start: 1200,
                alert_count: 4,
            },
            TimeBucket {
                bucket_start: 1500,
                alert_count: 9,
            },
        ];

        let (correlated, _, uncorrelated_spikes) = match_changes(&changes, &spikes, 600);
        assert_eq!(correlated[0].spike.bucket_start, 1200);
        assert_eq!(uncorrelated_spikes, vec![spikes[1]]);
    }

    #[test]
    fn spike_may_match_multiple_changes() {
        let changes = vec![change(1, 1000), change(2, 1050)];
        let spikes = vec![TimeBucket {
            bucket_start: 1100,
            alert_count: 5,
        }];

        let (correlated, leftover_changes, _) = match_changes(&changes, &spikes, 600);
        assert_eq!(correlated.len(), 2);
        assert!(leftover_changes.is_empty());
    }

    #[test]
    fn spike_before_change_never_matches() {
        let changes = vec![change(1, 2000)];
        let spikes = vec![TimeBucket {
            bucket_start: 1700,
            alert_count: 5,
        }];

        let (correlated, leftover_changes, leftover_spikes) =
            match_changes(&changes, &spikes, 600);
        assert!(correlated.is_empty());
        assert_eq!(leftover_changes.len(), 1);
        assert_eq!(leftover_spikes.len(), 1);
    }

    #[test]
    fn millisecond_change_timestamps_are_normalized() {
        let changes = vec![change(1, 1_700_000_000_000)];
        let spikes = vec![TimeBucket {
            bucket_start: 1_700_000_100,
            alert_count: 5,
        }];

        let (correlated, _, _) = match_changes(&changes, &spikes, 600);
        assert_eq!(correlated.len(), 1);
        assert_eq!(correlated[0].change.timestamp, 1_700_000_000);
    }

    struct ScriptedAlerts {
        alerts: Vec<AlertRecord>,
    }

    #[async_trait]
    impl AlertQuery for ScriptedAlerts {
        async fn alerts_since(
            &self,
            _start_epoch: Epoch,
            _limit: usize,
        ) -> ProviderResult<Vec<AlertRecord>> {
            Ok(self.alerts.clone())
        }

        async fn active_alerts(
            &self,
            _device_id: u64,
            _limit: usize,
        ) -> ProviderResult<Vec<AlertRecord>> {
            Ok(Vec::new())
        }
    }

    struct FailingAudits;

    #[async_trait]
    impl AuditQuery for FailingAudits {
        async fn changes_since(
            &self,
            _start_epoch: Epoch,
            _limit: usize,
        ) -> ProviderResult<Vec<ChangeRecord>> {
            Err(ProviderError::Unavailable("audit backend down".to_string()))
        }
    }

    #[tokio::test]
    async fn audit_failure_degrades_to_empty_changes() {
        let alerts: Vec<AlertRecord> = (0..10).map(|i| alert("a", 1000 + i * 10)).collect();
        let engine = ChangeCorrelationEngine::new(
            Arc::new(ScriptedAlerts { alerts }),
            Arc::new(FailingAudits),
        );

        let report = engine.correlate_at(10_000, 1, 10).await.unwrap();
        assert_eq!(report.total_alerts, 10);
        assert_eq!(report.total_changes, 0);
        assert!(report.correlated_events.is_empty());
    }

    struct ScriptedAudits {
        changes: Vec<ChangeRecord>,
    }

    #[async_trait]
    impl AuditQuery for ScriptedAudits {
        async fn changes_since(
            &self,
            _start_epoch: Epoch,
            _limit: usize,
        ) -> ProviderResult<Vec<ChangeRecord>> {
            Ok(self.changes.clone())
        }
    }

    #[tokio::test]
    async fn end_to_end_correlates_spike_after_change() {
        // 20 calm buckets then a burst of 10 alerts in one bucket
        let mut alerts: Vec<AlertRecord> = (0..20).map(|i| alert("calm", i * 300)).collect();
        alerts.extend((0..10).map(|i| alert("burst", 6000 + i)));

        let engine = ChangeCorrelationEngine::new(
            Arc::new(ScriptedAlerts { alerts }),
            Arc::new(ScriptedAudits {
                changes: vec![change(7, 5900)],
            }),
        );

        let report = engine.correlate_at(10_000, 3, 10).await.unwrap();
        assert_eq!(report.total_spikes, 1);
        assert_eq!(report.correlated_events.len(), 1);
        let event = &report.correlated_events[0];
        assert_eq!(event.change.id, 7);
        assert_eq!(event.spike.bucket_start, 6000);
        assert!(report.uncorrelated_changes.is_empty());
        assert!(report.uncorrelated_spikes.is_empty());
    }
}
