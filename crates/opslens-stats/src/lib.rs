//! Statistical primitives for the OpsLens analytics engines
//!
//! Pure functions over numeric slices; no I/O, no async. Edge cases that
//! would otherwise divide by zero (constant series, zero mean) return neutral
//! values instead of failing, so callers only handle structural errors such
//! as mismatched lengths.

pub mod changepoint;
pub mod correlation;
pub mod descriptive;
pub mod entropy;
pub mod error;
pub mod regression;

pub use changepoint::{cusum, ChangePoint, Direction};
pub use correlation::{autocorrelation, pearson_correlation};
pub use descriptive::{coefficient_of_variation, mean, sample_stddev};
pub use entropy::shannon_entropy;
pub use error::{StatsError, StatsResult};
pub use regression::{linear_regression, LinearFit};
