//! Baseline capture and deviation comparison for OpsLens
//!
//! A baseline is a per-datapoint statistical summary of a resource's metrics
//! over a window, persisted by name through the [`opslens_core::VariableStore`]
//! capability. Later windows are compared against it to classify each
//! datapoint as normal, elevated, reduced, or anomalous.

pub mod baseline;
pub mod error;
pub mod manager;

pub use baseline::{
    Baseline, BaselineSaved, ComparisonReport, DatapointComparison, DatapointStats,
    DeviationStatus, ResourceOverrides,
};
pub use error::{BaselineError, BaselineResult};
pub use manager::BaselineManager;
