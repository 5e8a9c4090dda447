//! Alert-derived availability and MTTR
//!
//! Treats each sufficiently severe alert as an outage interval on its
//! device, merges overlaps, and reports per-device and aggregate uptime.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use opslens_core::types::normalize_epoch;
use opslens_core::{AlertQuery, Epoch};

const DEFAULT_FETCH_LIMIT: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceAvailability {
    pub availability_percent: f64,
    pub downtime_seconds: i64,
    pub incident_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityReport {
    pub window_hours: i64,
    /// Worst per-device availability, 100.0 when no device had an outage
    pub aggregate_availability_percent: f64,
    /// Mean merged-incident duration in minutes, `None` without incidents
    pub mttr_minutes: Option<f64>,
    pub longest_incident_minutes: Option<f64>,
    pub devices: BTreeMap<String, DeviceAvailability>,
}

/// Merge overlapping or touching `(start, end)` intervals
///
/// Input need not be sorted; output is sorted and disjoint.
pub fn merge_intervals(mut intervals: Vec<(Epoch, Epoch)>) -> Vec<(Epoch, Epoch)> {
    intervals.retain(|(start, end)| end > start);
    intervals.sort_unstable();

    let mut merged: Vec<(Epoch, Epoch)> = Vec::with_capacity(intervals.len());
    for (start, end) in intervals {
        match merged.last_mut() {
            Some((_, last_end)) if start <= *last_end => {
                *last_end = (*last_end).max(end);
            }
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Computes availability from the alert stream
#[derive(Clone)]
pub struct AvailabilityCalculator {
    alerts: Arc<dyn AlertQuery>,
}

impl AvailabilityCalculator {
    pub fn new(alerts: Arc<dyn AlertQuery>) -> Self {
        Self { alerts }
    }

    /// Availability over the trailing `hours_back`, counting only alerts at
    /// or above `severity_threshold` as outages
    pub async fn availability(
        &self,
        hours_back: i64,
        severity_threshold: i32,
    ) -> crate::error::ScoringResult<AvailabilityReport> {
        self.availability_at(Utc::now().timestamp(), hours_back, severity_threshold)
            .await
    }

    pub async fn availability_at(
        &self,
        now: Epoch,
        hours_back: i64,
        severity_threshold: i32,
    ) -> crate::error::ScoringResult<AvailabilityReport> {
        let window_start = now - hours_back * 3600;
        let window_secs = hours_back * 3600;

        let alerts = self
            .alerts
            .alerts_since(window_start, DEFAULT_FETCH_LIMIT)
            .await?;

        let mut outages: BTreeMap<String, Vec<(Epoch, Epoch)>> = BTreeMap::new();
        for alert in &alerts {
            if alert.severity < severity_threshold {
                continue;
            }
            let start = normalize_epoch(alert.start_epoch).max(window_start);
            let end = if alert.end_epoch > 0 {
                normalize_epoch(alert.end_epoch)
            } else {
                now
            }
            .min(now);
            if end > start {
                outages
                    .entry(alert.device_name.clone())
                    .or_default()
                    .push((start, end));
            }
        }

        let mut devices = BTreeMap::new();
        let mut incident_minutes: Vec<f64> = Vec::new();
        for (device, intervals) in outages {
            let merged = merge_intervals(intervals);
            let downtime: i64 = merged.iter().map(|(s, e)| e - s).sum();
            incident_minutes.extend(merged.iter().map(|(s, e)| (e - s) as f64 / 60.0));
            devices.insert(
                device,
                DeviceAvailability {
                    availability_percent: (1.0 - downtime as f64 / window_secs as f64) * 100.0,
                    downtime_seconds: downtime,
                    incident_count: merged.len(),
                },
            );
        }

        let aggregate = devices
            .values()
            .map(|d| d.availability_percent)
            .fold(100.0_f64, f64::min);
        let mttr_minutes = if incident_minutes.is_empty() {
            None
        } else {
            Some(incident_minutes.iter().sum::<f64>() / incident_minutes.len() as f64)
        };
        let longest_incident_minutes = incident_minutes
            .iter()
            .copied()
            .fold(None, |acc: Option<f64>, m| Some(acc.map_or(m, |a| a.max(m))));

        debug!(
            devices = devices.len(),
            aggregate, "availability computed"
        );
        Ok(AvailabilityReport {
            window_hours: hours_back,
            aggregate_availability_percent: aggregate,
            mttr_minutes,
            longest_incident_minutes,
            devices,
        })
    }
}
