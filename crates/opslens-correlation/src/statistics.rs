//! Aggregate alert statistics for one lookback window

use std::collections::BTreeMap;

use chrono::{TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use opslens_core::types::{normalize_epoch, severity_name};
use opslens_core::AlertRecord;

const TOP_SOURCES: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertStatisticsReport {
    pub total_alerts: usize,
    pub active_alerts: usize,
    pub by_severity: BTreeMap<String, usize>,
    /// Noisiest devices, descending by alert count
    pub top_devices: Vec<(String, usize)>,
    /// Noisiest datasources, descending by alert count
    pub top_datasources: Vec<(String, usize)>,
    /// Alert counts per UTC hour of day
    pub by_hour: BTreeMap<u32, usize>,
}

fn top_counts(counts: BTreeMap<&str, usize>) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(TOP_SOURCES);
    ranked
}

/// Summarize alerts by severity, source, and UTC hour of day
pub fn alert_statistics(alerts: &[AlertRecord]) -> AlertStatisticsReport {
    let mut by_severity: BTreeMap<String, usize> = BTreeMap::new();
    let mut devices: BTreeMap<&str, usize> = BTreeMap::new();
    let mut datasources: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_hour: BTreeMap<u32, usize> = BTreeMap::new();
    let mut active = 0;

    for alert in alerts {
        *by_severity
            .entry(severity_name(alert.severity).to_string())
            .or_insert(0) += 1;
        *devices.entry(&alert.device_name).or_insert(0) += 1;
        *datasources.entry(&alert.datasource).or_insert(0) += 1;
        if !alert.cleared {
            active += 1;
        }
        if let Some(started) = Utc
            .timestamp_opt(normalize_epoch(alert.start_epoch), 0)
            .single()
        {
            *by_hour.entry(started.hour()).or_insert(0) += 1;
        }
    }

    AlertStatisticsReport {
        total_alerts: alerts.len(),
        active_alerts: active,
        by_severity,
        top_devices: top_counts(devices),
        top_datasources: top_counts(datasources),
        by_hour,
    }
}
