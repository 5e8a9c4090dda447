//! Error types for collaborator capabilities

use thiserror::Error;

/// Errors surfaced by provider implementations
///
/// Engines decide per call site whether a provider failure is fatal or
/// tolerated; the error type itself carries no such policy.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The backing service could not be reached
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The query was rejected or failed remotely
    #[error("query failed: {0}")]
    Query(String),

    /// The provider returned a payload the engine cannot interpret
    #[error("malformed provider payload: {0}")]
    Payload(String),

    /// Serialization error while encoding or decoding stored values
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;
