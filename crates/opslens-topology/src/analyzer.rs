//! Breadth-first impact traversal and composite scoring

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use opslens_core::{AlertQuery, GraphNode, TopologyQuery};

use crate::config::BlastRadiusConfig;

const CRITICAL_SEVERITY: i32 = 4;

/// A device reachable from the failing device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffectedDevice {
    pub device_id: u64,
    pub device_name: String,
    /// Hop count from the start device, 1-indexed
    pub depth: i64,
    pub active_alert_count: usize,
    pub has_critical: bool,
}

/// A device reachable from two or more distinct visited devices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalPathDevice {
    pub device_id: u64,
    pub device_name: String,
    pub connection_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlastRadiusReport {
    pub device_id: u64,
    /// Depth actually traversed after clamping
    pub depth: i64,
    pub total_affected_devices: usize,
    /// Affected devices carrying at least one critical alert
    pub critical_alert_count: usize,
    /// Composite impact score in `[0, 100]`
    pub blast_radius_score: u32,
    pub affected_devices: Vec<AffectedDevice>,
    pub critical_path_devices: Vec<CriticalPathDevice>,
}

/// Traverses the device graph outward from a failing device and scores the
/// downstream impact
///
/// Neighbor discovery goes through a primary collaborator with an optional
/// fallback; both failing for a node is treated as that node having no
/// neighbors. Analysis itself never fails.
#[derive(Clone)]
pub struct BlastRadiusAnalyzer {
    topology: Arc<dyn TopologyQuery>,
    fallback: Option<Arc<dyn TopologyQuery>>,
    alerts: Arc<dyn AlertQuery>,
    config: BlastRadiusConfig,
}

impl BlastRadiusAnalyzer {
    pub fn new(
        topology: Arc<dyn TopologyQuery>,
        fallback: Option<Arc<dyn TopologyQuery>>,
        alerts: Arc<dyn AlertQuery>,
    ) -> Self {
        Self::with_config(topology, fallback, alerts, BlastRadiusConfig::default())
    }

    pub fn with_config(
        topology: Arc<dyn TopologyQuery>,
        fallback: Option<Arc<dyn TopologyQuery>>,
        alerts: Arc<dyn AlertQuery>,
        config: BlastRadiusConfig,
    ) -> Self {
        Self {
            topology,
            fallback,
            alerts,
            config,
        }
    }

    async fn neighbors_of(&self, device_id: u64) -> Vec<GraphNode> {
        match self.topology.neighbors(device_id).await {
            Ok(nodes) => nodes,
            Err(primary_err) => {
                if let Some(fallback) = &self.fallback {
                    match fallback.neighbors(device_id).await {
                        Ok(nodes) => nodes,
                        Err(fallback_err) => {
                            warn!(
                                device_id,
                                primary = %primary_err,
                                fallback = %fallback_err,
                                "neighbor discovery failed, treating as leaf"
                            );
                            Vec::new()
                        }
                    }
                } else {
                    warn!(device_id, error = %primary_err, "neighbor discovery failed, treating as leaf");
                    Vec::new()
                }
            }
        }
    }

    /// Traverse up to `depth` hops out from `device_id` and score the impact
    pub async fn analyze(&self, device_id: u64, depth: i64) -> BlastRadiusReport {
        let depth = depth.clamp(1, self.config.max_depth);

        let mut visited: HashSet<u64> = HashSet::from([device_id]);
        let mut affected: Vec<AffectedDevice> = Vec::new();
        let mut parents_of: HashMap<u64, HashSet<u64>> = HashMap::new();
        let mut names: HashMap<u64, String> = HashMap::new();
        let mut frontier = vec![device_id];

        'traversal: for layer in 1..=depth {
            let mut next_frontier = Vec::new();
            for &parent in &frontier {
                let neighbors = self.neighbors_of(parent).await;
                for node in neighbors {
                    parents_of.entry(node.id).or_default().insert(parent);
                    let name = names.entry(node.id).or_insert(node.display_name).clone();
                    if visited.len() >= self.config.max_nodes {
                        debug!(cap = self.config.max_nodes, "visited cap reached");
                        break 'traversal;
                    }
                    if visited.insert(node.id) {
                        affected.push(AffectedDevice {
                            device_id: node.id,
                            device_name: name,
                            depth: layer,
                            active_alert_count: 0,
                            has_critical: false,
                        });
                        next_frontier.push(node.id);
                    }
                }
            }
            if next_frontier.is_empty() {
                break;
            }
            frontier = next_frontier;
        }

        let mut critical_alert_count = 0;
        let check_count = affected.len().min(self.config.alert_check_limit);
        for device in affected.iter_mut().take(check_count) {
            match self
                .alerts
                .active_alerts(device.device_id, self.config.active_alert_fetch_limit)
                .await
            {
                Ok(active) => {
                    device.active_alert_count = active.len();
                    device.has_critical = active
                        .iter()
                        .any(|a| a.severity >= CRITICAL_SEVERITY);
                    if device.has_critical {
                        critical_alert_count += 1;
                    }
                }
                Err(err) => {
                    debug!(device_id = device.device_id, error = %err, "alert lookup failed, assuming quiet");
                }
            }
        }

        let affected_ids: HashSet<u64> = affected.iter().map(|d| d.device_id).collect();
        let mut critical_path_devices: Vec<CriticalPathDevice> = parents_of
            .iter()
            .filter(|(id, parents)| affected_ids.contains(id) && parents.len() >= 2)
            .map(|(id, parents)| CriticalPathDevice {
                device_id: *id,
                device_name: names
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| format!("device-{id}")),
                connection_count: parents.len(),
            })
            .collect();
        critical_path_devices
            .sort_by(|a, b| b.connection_count.cmp(&a.connection_count).then(a.device_id.cmp(&b.device_id)));

        let score = (affected.len() * 10
            + critical_alert_count * 15
            + critical_path_devices.len() * 20)
            .min(100) as u32;

        info!(
            device_id,
            depth,
            affected = affected.len(),
            score,
            "blast radius analyzed"
        );
        BlastRadiusReport {
            device_id,
            depth,
            total_affected_devices: affected.len(),
            critical_alert_count,
            blast_radius_score: score,
            affected_devices: affected,
            critical_path_devices,
        }
    }
}
