//! Composite scoring over alert and metric streams
//!
//! Three independent scorers: alert-noise quality (entropy, flapping,
//! repetition), current device health (z-score of the latest sample against
//! its own history), and alert-derived availability with MTTR.

pub mod availability;
pub mod error;
pub mod health;
pub mod noise;

pub use availability::{
    merge_intervals, AvailabilityCalculator, AvailabilityReport, DeviceAvailability,
};
pub use error::{ScoringError, ScoringResult};
pub use health::{DatapointFactor, HealthReport, HealthScorer, HealthStatus};
pub use noise::{noise_report_for, NoiseReport, NoiseScorer};
