//! Error types for the baseline system

use thiserror::Error;

use opslens_core::ProviderError;
use opslens_metrics::MetricsError;

/// Errors from baseline capture and comparison
#[derive(Debug, Error)]
pub enum BaselineError {
    /// No baseline stored under the requested name
    #[error("baseline '{0}' not found; save one first")]
    NotFound(String),

    /// The variable store failed
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The metric fetch failed
    #[error(transparent)]
    Metrics(#[from] MetricsError),

    /// A stored baseline could not be decoded
    #[error("stored baseline is unreadable: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Result alias for baseline operations
pub type BaselineResult<T> = Result<T, BaselineError>;
