use serde::{Deserialize, Serialize};

/// Tuning knobs for the correlation engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationConfig {
    /// Width of the alert-count buckets, in seconds
    pub bucket_size_secs: i64,
    /// Maximum alerts pulled per lookback window
    pub alert_fetch_limit: usize,
    /// Maximum change events pulled per lookback window
    pub change_fetch_limit: usize,
    /// Uncorrelated changes retained before report truncation
    pub uncorrelated_change_cap: usize,
    /// Items reported per uncorrelated list
    pub report_item_cap: usize,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            bucket_size_secs: 300,
            alert_fetch_limit: 1000,
            change_fetch_limit: 300,
            uncorrelated_change_cap: 20,
            report_item_cap: 10,
        }
    }
}
