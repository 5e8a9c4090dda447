//! Grouping related alerts by shared source or time proximity

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use opslens_core::types::normalize_epoch;
use opslens_core::{AlertRecord, Epoch};

/// A group of alerts sharing a device or datasource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertCluster {
    pub key: String,
    pub alert_count: usize,
    pub alert_ids: Vec<String>,
}

/// A run of alerts whose consecutive start times stay within one window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalCluster {
    pub window_start: Epoch,
    pub window_end: Epoch,
    pub alert_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterReport {
    pub total_alerts: usize,
    pub by_device: Vec<AlertCluster>,
    pub by_datasource: Vec<AlertCluster>,
    pub temporal: Vec<TemporalCluster>,
}

fn keyed_clusters(alerts: &[AlertRecord], key_of: impl Fn(&AlertRecord) -> &str) -> Vec<AlertCluster> {
    let mut groups: BTreeMap<&str, Vec<&AlertRecord>> = BTreeMap::new();
    for alert in alerts {
        groups.entry(key_of(alert)).or_default().push(alert);
    }

    let mut clusters: Vec<AlertCluster> = groups
        .into_iter()
        .filter(|(_, members)| members.len() >= 2)
        .map(|(key, members)| AlertCluster {
            key: key.to_string(),
            alert_count: members.len(),
            alert_ids: members.iter().map(|a| a.id.clone()).collect(),
        })
        .collect();
    clusters.sort_by(|a, b| b.alert_count.cmp(&a.alert_count).then(a.key.cmp(&b.key)));
    clusters
}

fn temporal_clusters(alerts: &[AlertRecord], window_secs: i64) -> Vec<TemporalCluster> {
    let mut starts: Vec<Epoch> = alerts
        .iter()
        .map(|a| normalize_epoch(a.start_epoch))
        .collect();
    starts.sort_unstable();

    let mut clusters = Vec::new();
    let mut run_start = 0;
    for idx in 1..=starts.len() {
        let run_ended =
            idx == starts.len() || starts[idx] - starts[idx - 1] > window_secs;
        if run_ended {
            let count = idx - run_start;
            if count >= 2 {
                clusters.push(TemporalCluster {
                    window_start: starts[run_start],
                    window_end: starts[idx - 1],
                    alert_count: count,
                });
            }
            run_start = idx;
        }
    }
    clusters.sort_by(|a, b| b.alert_count.cmp(&a.alert_count));
    clusters
}

/// Cluster alerts three ways: shared device, shared datasource, and runs of
/// starts within `window_secs` of each other
///
/// Only groups of two or more alerts are reported; each list is sorted by
/// descending size.
pub fn cluster_alerts(alerts: &[AlertRecord], window_secs: i64) -> ClusterReport {
    ClusterReport {
        total_alerts: alerts.len(),
        by_device: keyed_clusters(alerts, |a| &a.device_name),
        by_datasource: keyed_clusters(alerts, |a| &a.datasource),
        temporal: temporal_clusters(alerts, window_secs),
    }
}
