use thiserror::Error;

use opslens_core::ProviderError;

#[derive(Debug, Error)]
pub enum CorrelationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

pub type CorrelationResult<T> = Result<T, CorrelationError>;
