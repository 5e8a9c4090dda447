//! Collaborator capability traits consumed by the analytics engines
//!
//! Implementations adapt a concrete monitoring backend (REST client, message
//! bus, fixture data) to these shapes. Engines never see transport details.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProviderResult;
use crate::types::{AlertRecord, ChangeRecord, Epoch, GraphNode, RawMetricData, ResourceSelector};

/// Raw time-series access for a monitored resource
#[async_trait]
pub trait MetricQuery: Send + Sync {
    /// Fetch the raw value matrix for a resource over `[start, end]`
    ///
    /// `datapoints` is an optional comma-separated filter; all datapoints are
    /// returned when omitted.
    async fn fetch_raw(
        &self,
        resource: &ResourceSelector,
        datapoints: Option<&str>,
        start: Epoch,
        end: Epoch,
    ) -> ProviderResult<RawMetricData>;
}

/// Alert history and active-alert state
#[async_trait]
pub trait AlertQuery: Send + Sync {
    /// Fetch alerts (active and cleared) that started at or after `start_epoch`
    async fn alerts_since(&self, start_epoch: Epoch, limit: usize)
        -> ProviderResult<Vec<AlertRecord>>;

    /// Fetch uncleared alerts currently firing on a device
    async fn active_alerts(&self, device_id: u64, limit: usize)
        -> ProviderResult<Vec<AlertRecord>>;
}

/// Configuration-change / audit-log access
#[async_trait]
pub trait AuditQuery: Send + Sync {
    /// Fetch change events that happened at or after `start_epoch`
    async fn changes_since(
        &self,
        start_epoch: Epoch,
        limit: usize,
    ) -> ProviderResult<Vec<ChangeRecord>>;
}

/// Device connectivity discovery
///
/// Adjacency is discovered lazily, one device at a time; no pre-loaded graph
/// is ever assumed.
#[async_trait]
pub trait TopologyQuery: Send + Sync {
    /// Fetch the neighbors of a device
    async fn neighbors(&self, device_id: u64) -> ProviderResult<Vec<GraphNode>>;
}

/// Named key-value persistence used to keep baselines between calls
///
/// The store owns consistency and durability; the engines treat each call as
/// a single synchronous get/put.
#[async_trait]
pub trait VariableStore: Send + Sync {
    /// Read a named value, `None` when absent
    async fn get(&self, name: &str) -> ProviderResult<Option<Value>>;

    /// Write a named value, overwriting any prior value
    async fn set(&self, name: &str, value: Value) -> ProviderResult<()>;
}
