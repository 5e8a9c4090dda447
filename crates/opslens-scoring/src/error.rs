use thiserror::Error;

use opslens_core::ProviderError;
use opslens_metrics::MetricsError;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

pub type ScoringResult<T> = Result<T, ScoringError>;
