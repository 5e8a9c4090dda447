//! Baseline and comparison data types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use opslens_core::{Epoch, ResourceSelector};

/// Summary statistics for one datapoint over the baseline window
///
/// All statistics are `None` when no samples survived filtering; the
/// datapoint is still recorded rather than omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatapointStats {
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub stddev: Option<f64>,
    pub sample_count: usize,
}

impl DatapointStats {
    /// Entry for a datapoint with no usable samples
    pub fn unavailable() -> Self {
        Self {
            mean: None,
            min: None,
            max: None,
            stddev: None,
            sample_count: 0,
        }
    }
}

/// A stored baseline: per-datapoint statistics plus the identity and window
/// they were computed from
///
/// Immutable once created except by being overwritten under the same name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Baseline {
    pub resource: ResourceSelector,
    pub datapoints: BTreeMap<String, DatapointStats>,
    pub window_hours: i64,
    pub created_at: Epoch,
}

/// Confirmation returned after saving a baseline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineSaved {
    pub baseline_name: String,
    pub resource: ResourceSelector,
    pub window_hours: i64,
    pub datapoints: BTreeMap<String, DatapointStats>,
}

/// Per-call overrides for the resource identity stored in a baseline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceOverrides {
    pub device_id: Option<u64>,
    pub datasource_id: Option<u64>,
    pub instance_id: Option<u64>,
}

impl ResourceOverrides {
    /// Resolve against a stored resource, preferring overridden fields
    pub fn apply(&self, stored: ResourceSelector) -> ResourceSelector {
        ResourceSelector {
            device_id: self.device_id.unwrap_or(stored.device_id),
            datasource_id: self.datasource_id.unwrap_or(stored.datasource_id),
            instance_id: self.instance_id.unwrap_or(stored.instance_id),
        }
    }
}

/// Deviation classification for one datapoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationStatus {
    /// Within 20% of the baseline mean
    Normal,
    /// 20-50% above the baseline mean
    Elevated,
    /// 20-50% below the baseline mean
    Reduced,
    /// More than 50% away from the baseline mean
    Anomalous,
    /// No fresh samples to compare
    NoData,
}

/// Comparison outcome for one datapoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatapointComparison {
    pub status: DeviationStatus,
    pub baseline_mean: f64,
    pub current_mean: Option<f64>,
    /// Absolute deviation from the baseline mean as a percentage; `None`
    /// when there is no data or the deviation is unbounded (zero baseline
    /// mean with nonzero current mean)
    pub deviation_percent: Option<f64>,
}

/// Full comparison report against a named baseline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub baseline_name: String,
    pub comparisons: BTreeMap<String, DatapointComparison>,
    pub hours_compared: i64,
}

/// Classify a deviation percentage, breaking the 20-50% band by direction
pub fn classify_deviation(
    deviation_pct: f64,
    current_mean: f64,
    baseline_mean: f64,
) -> DeviationStatus {
    if deviation_pct <= 20.0 {
        DeviationStatus::Normal
    } else if deviation_pct <= 50.0 {
        if current_mean > baseline_mean {
            DeviationStatus::Elevated
        } else {
            DeviationStatus::Reduced
        }
    } else {
        DeviationStatus::Anomalous
    }
}
