//! Error types for the statistics primitives

use thiserror::Error;

/// Structural errors in numeric input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    /// Paired series have different lengths
    #[error("series lengths differ: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first series
        left: usize,
        /// Length of the second series
        right: usize,
    },

    /// Not enough data points for the computation
    #[error("at least {required} data points required, got {actual}")]
    TooFewPoints {
        /// Minimum number of points the computation needs
        required: usize,
        /// Number of points supplied
        actual: usize,
    },
}

/// Result alias for statistics operations
pub type StatsResult<T> = Result<T, StatsError>;
