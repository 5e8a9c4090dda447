//! Error types for metric-series analytics

use thiserror::Error;

use opslens_core::ProviderError;

/// Errors from the metric analytics engines
///
/// A failed primary metric fetch is fatal to the call; there is no degraded
/// path for missing series data.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The metric backend failed
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Result alias for metric analytics operations
pub type MetricsResult<T> = Result<T, MetricsError>;
