//! Alert/change correlation engine
//!
//! Buckets alert start-times into fixed windows, flags statistically
//! anomalous buckets as spikes, and matches spikes against configuration
//! change events by temporal proximity. Also provides alert clustering and
//! summary statistics over the same alert stream.

pub mod clusters;
pub mod config;
pub mod engine;
pub mod error;
pub mod statistics;

pub use clusters::{cluster_alerts, AlertCluster, ClusterReport, TemporalCluster};
pub use config::CorrelationConfig;
pub use engine::{
    bucket_alerts, detect_spikes, match_changes, ChangeCorrelationEngine, ChangeSummary,
    CorrelatedEvent, CorrelationReport, TimeBucket,
};
pub use error::{CorrelationError, CorrelationResult};
pub use statistics::{alert_statistics, AlertStatisticsReport};
