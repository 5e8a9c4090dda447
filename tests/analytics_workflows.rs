//! End-to-end workflows across the analytics crates, driven by scripted
//! collaborators.

use std::sync::Arc;

use async_trait::async_trait;

use opslens_baselines::{BaselineManager, DeviationStatus, ResourceOverrides};
use opslens_core::{
    AlertQuery, AlertRecord, AuditQuery, ChangeRecord, Epoch, InMemoryVariableStore, MetricQuery,
    ProviderResult, RawMetricData, RawValue, ResourceSelector,
};
use opslens_correlation::ChangeCorrelationEngine;
use opslens_metrics::SeriesFetcher;
use opslens_scoring::NoiseScorer;

struct ScriptedMetrics {
    datapoints: Vec<(&'static str, Vec<f64>)>,
    timestamps: Vec<i64>,
}

#[async_trait]
impl MetricQuery for ScriptedMetrics {
    async fn fetch_raw(
        &self,
        _resource: &ResourceSelector,
        _datapoints: Option<&str>,
        _start: Epoch,
        _end: Epoch,
    ) -> ProviderResult<RawMetricData> {
        let rows = (0..self.timestamps.len())
            .map(|row| {
                self.datapoints
                    .iter()
                    .map(|(_, values)| RawValue::Number(values[row]))
                    .collect()
            })
            .collect();
        Ok(RawMetricData {
            datapoint_names: self.datapoints.iter().map(|(n, _)| n.to_string()).collect(),
            values: rows,
            timestamps: self.timestamps.clone(),
        })
    }
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

fn alert(id: &str, severity: i32, start: Epoch, end: Epoch) -> AlertRecord {
    AlertRecord {
        id: id.to_string(),
        severity,
        start_epoch: start,
        end_epoch: end,
        device_name: "core-sw-01".to_string(),
        datasource: "Ping".to_string(),
        datapoint: "PingLossPercent".to_string(),
        cleared: end > 0,
    }
}

fn resource() -> ResourceSelector {
    ResourceSelector {
        device_id: 42,
        datasource_id: 7,
        instance_id: 1,
    }
}

#[tokio::test]
async fn baseline_round_trip_on_identical_data_is_all_normal() {
    let metrics = Arc::new(ScriptedMetrics {
        datapoints: vec![
            ("cpu", vec![40.0, 42.0, 41.0, 43.0]),
            ("mem", vec![70.0, 71.0, 69.0, 70.0]),
        ],
        timestamps: vec![1_700_000_000, 1_700_000_300, 1_700_000_600, 1_700_000_900],
    });
    let manager = BaselineManager::new(
        Arc::new(InMemoryVariableStore::new()),
        SeriesFetcher::new(metrics),
    );

    let saved = manager
        .save_baseline_at(1_700_100_000, resource(), "nightly", None, 24)
        .await
        .unwrap();
    assert_eq!(saved.datapoints.len(), 2);
    assert_eq!(saved.datapoints["cpu"].sample_count, 4);

    let report = manager
        .compare_to_baseline_at(1_700_200_000, "nightly", ResourceOverrides::default(), 4)
        .await
        .unwrap();
    assert_eq!(report.comparisons.len(), 2);
    for comparison in report.comparisons.values() {
        assert_eq!(comparison.status, DeviationStatus::Normal);
        assert_eq!(comparison.deviation_percent, Some(0.0));
    }
}

#[tokio::test]
async fn baseline_compare_with_device_override() {
    let metrics = Arc::new(ScriptedMetrics {
        datapoints: vec![("cpu", vec![10.0, 10.0])],
        timestamps: vec![1_700_000_000, 1_700_000_300],
    });
    let manager = BaselineManager::new(
        Arc::new(InMemoryVariableStore::new()),
        SeriesFetcher::new(metrics),
    );

    manager
        .save_baseline_at(1_700_100_000, resource(), "fleet", None, 24)
        .await
        .unwrap();

    let overrides = ResourceOverrides {
        device_id: Some(99),
        ..Default::default()
    };
    let report = manager
        .compare_to_baseline_at(1_700_200_000, "fleet", overrides, 2)
        .await
        .unwrap();
    assert_eq!(report.comparisons["cpu"].status, DeviationStatus::Normal);
}

#[tokio::test]
async fn change_before_alert_burst_is_correlated() {
    // steady background of one alert per bucket, then a burst right after a
    // config change
    let mut alerts: Vec<AlertRecord> = (0..30)
        .map(|i| alert(&format!("bg-{i}"), 2, 1_700_000_000 + i * 300, 0))
        .collect();
    alerts.extend((0..8).map(|i| alert(&format!("burst-{i}"), 3, 1_700_009_000 + i, 0)));

    let engine = ChangeCorrelationEngine::new(
        Arc::new(ScriptedAlerts { alerts }),
        Arc::new(ScriptedAudits {
            changes: vec![ChangeRecord {
                id: 1234,
                happened_on: 1_700_008_700,
                username: "netops".to_string(),
                description: "pushed new BGP policy".to_string(),
            }],
        }),
    );

    let report = engine.correlate_at(1_700_020_000, 6, 15).await.unwrap();
    assert_eq!(report.total_alerts, 38);
    assert_eq!(report.total_changes, 1);
    assert_eq!(report.total_spikes, 1);
    assert_eq!(report.correlated_events.len(), 1);

    let event = &report.correlated_events[0];
    assert_eq!(event.change.id, 1234);
    assert!(event.confidence > 0.5);
    assert!(report.uncorrelated_changes.is_empty());
}

#[tokio::test]
async fn unrelated_change_stays_uncorrelated() {
    let alerts: Vec<AlertRecord> = (0..10)
        .map(|i| alert(&format!("bg-{i}"), 2, 1_700_000_000 + i * 300, 0))
        .collect();

    let engine = ChangeCorrelationEngine::new(
        Arc::new(ScriptedAlerts { alerts }),
        Arc::new(ScriptedAudits {
            changes: vec![ChangeRecord {
                id: 55,
                happened_on: 1_700_001_000,
                username: "netops".to_string(),
                description: "renamed a dashboard".to_string(),
            }],
        }),
    );

    let report = engine.correlate_at(1_700_010_000, 3, 15).await.unwrap();
    assert_eq!(report.total_spikes, 0);
    assert!(report.correlated_events.is_empty());
    assert_eq!(report.uncorrelated_changes.len(), 1);
    assert_eq!(report.uncorrelated_changes[0].id, 55);
}

#[tokio::test]
async fn flapping_stream_scores_noisy() {
    // same combo clearing and re-firing within minutes
    let alerts: Vec<AlertRecord> = (0..6)
        .map(|i| {
            alert(
                &format!("flap-{i}"),
                3,
                1_700_000_000 + i * 600,
                1_700_000_000 + i * 600 + 300,
            )
        })
        .collect();

    let scorer = NoiseScorer::new(Arc::new(ScriptedAlerts { alerts }));
    let report = scorer.score_at(1_700_010_000, 2).await.unwrap();

    assert!(report.flap_ratio > 0.5);
    assert!(report.noise_score >= 30);
    assert!(!report.recommendations.is_empty());
}

#[tokio::test]
async fn reports_serialize_for_the_dispatch_layer() {
    let alerts: Vec<AlertRecord> = (0..4)
        .map(|i| alert(&format!("a-{i}"), 3, 1_700_000_000 + i * 60, 0))
        .collect();
    let engine = ChangeCorrelationEngine::new(
        Arc::new(ScriptedAlerts { alerts }),
        Arc::new(ScriptedAudits { changes: Vec::new() }),
    );

    let report = engine.correlate_at(1_700_010_000, 1, 15).await.unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["total_alerts"], 4);
    assert!(json["correlated_events"].is_array());
}
