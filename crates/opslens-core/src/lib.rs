//! Shared domain types and collaborator capabilities for OpsLens
//!
//! Every analytics engine in the workspace consumes external data through the
//! provider traits defined here and reports results as plain serde-serializable
//! structures. Transport, authentication, and retry policy all live behind the
//! provider implementations, never in the engines.

pub mod error;
pub mod memory;
pub mod providers;
pub mod types;

pub use error::{ProviderError, ProviderResult};
pub use memory::InMemoryVariableStore;
pub use providers::{AlertQuery, AuditQuery, MetricQuery, TopologyQuery, VariableStore};
pub use types::{
    normalize_epoch, severity_name, AlertRecord, ChangeRecord, Epoch, GraphNode, MetricSeries,
    RawMetricData, RawValue, ResourceSelector,
};
