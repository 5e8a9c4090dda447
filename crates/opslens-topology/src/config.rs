use serde::{Deserialize, Serialize};

/// Traversal and enrichment bounds for blast-radius analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlastRadiusConfig {
    /// Visited-set cap, start node included
    pub max_nodes: usize,
    /// Affected devices checked for active alerts
    pub alert_check_limit: usize,
    /// Deepest hop count a caller may request
    pub max_depth: i64,
    /// Active alerts fetched per checked device
    pub active_alert_fetch_limit: usize,
}

impl Default for BlastRadiusConfig {
    fn default() -> Self {
        Self {
            max_nodes: 100,
            alert_check_limit: 50,
            max_depth: 3,
            active_alert_fetch_limit: 5,
        }
    }
}
