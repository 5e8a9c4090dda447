//! Core domain types shared across the OpsLens analytics engines

use serde::{Deserialize, Serialize};

/// Epoch timestamp in seconds
pub type Epoch = i64;

/// Timestamps above this value are taken to be milliseconds
const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// Normalize an epoch timestamp that may be expressed in milliseconds
pub fn normalize_epoch(ts: i64) -> Epoch {
    if ts > MILLIS_THRESHOLD {
        ts / 1000
    } else {
        ts
    }
}

/// Human-readable name for an alert severity level
pub fn severity_name(severity: i32) -> &'static str {
    match severity {
        4 => "critical",
        3 => "error",
        2 => "warning",
        1 => "info",
        _ => "unknown",
    }
}

/// Identifies a monitored metric instance on a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSelector {
    /// Device ID
    pub device_id: u64,
    /// Device-datasource binding ID
    pub datasource_id: u64,
    /// Monitored instance ID
    pub instance_id: u64,
}

/// A single cell of a raw metric matrix
///
/// Metric backends report gaps either as a `"No Data"` sentinel string or as
/// null, so the wire value is a tagged union rather than a plain number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// A sampled numeric value
    Number(f64),
    /// A sentinel string such as `"No Data"`
    Text(String),
    /// The sample is absent entirely
    Missing,
}

impl RawValue {
    /// Return the numeric sample if this cell holds a usable value
    ///
    /// Sentinels, nulls, and NaN all count as filtered out.
    pub fn as_sample(&self) -> Option<f64> {
        match self {
            RawValue::Number(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }
}

/// Raw time-series payload as returned by a metric backend
///
/// `values` is row-major: one row per sampled timestamp, one column per
/// datapoint in `datapoint_names`. `timestamps` runs parallel to the rows and
/// may arrive in seconds or milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMetricData {
    pub datapoint_names: Vec<String>,
    pub values: Vec<Vec<RawValue>>,
    pub timestamps: Vec<i64>,
}

/// A columnar series for one datapoint after filtering and normalization
///
/// `values` and `timestamps` are kept in lock-step; an index into one is valid
/// for the other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub values: Vec<f64>,
    pub timestamps: Vec<Epoch>,
}

impl MetricSeries {
    /// Number of surviving samples
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no samples survived filtering
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An alert event as reported by the alerting backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Backend alert ID
    pub id: String,
    /// Severity level; 4 and above is critical
    pub severity: i32,
    /// Epoch seconds when the alert started
    pub start_epoch: Epoch,
    /// Epoch seconds when the alert ended; 0 while still active
    pub end_epoch: Epoch,
    /// Display name of the device the alert fired on
    pub device_name: String,
    /// Datasource the alert originated from
    pub datasource: String,
    /// Datapoint the alert originated from
    pub datapoint: String,
    /// Whether the alert has cleared
    pub cleared: bool,
}

/// A configuration-change or audit event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Backend change/audit ID
    pub id: u64,
    /// When the change happened; seconds or milliseconds
    pub happened_on: i64,
    /// User that made the change
    pub username: String,
    /// Free-form change description
    pub description: String,
}

/// A device node discovered during topology traversal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    /// Device ID
    pub id: u64,
    /// Display name of the device
    pub display_name: String,
}
