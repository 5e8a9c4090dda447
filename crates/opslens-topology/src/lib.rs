//! Blast-radius analysis
//!
//! Bounded breadth-first traversal of a lazily discovered device graph,
//! cross-referenced with active-alert state to estimate downstream impact.
//! Every collaborator failure inside a traversal is tolerated, so analysis
//! always produces a report.

pub mod analyzer;
pub mod config;

pub use analyzer::{AffectedDevice, BlastRadiusAnalyzer, BlastRadiusReport, CriticalPathDevice};
pub use config::BlastRadiusConfig;
