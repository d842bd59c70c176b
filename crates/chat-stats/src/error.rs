//! Error types for statistics refreshes.

use thiserror::Error;

/// Errors surfaced by a refresh.
///
/// Per-project fetch failures never appear here: they degrade that project's
/// numbers instead. These are batch-level outcomes.
#[derive(Debug, Clone, Error)]
pub enum StatsError {
    /// The project list could not be processed.
    #[error("invalid project id: {0:?}")]
    InvalidProjectId(String),

    /// The batch failed outside any single project.
    #[error("batch failed: {0}")]
    BatchFailed(String),

    /// A newer refresh replaced this one before it finished.
    #[error("refresh superseded by a newer request")]
    Superseded,

    /// Invalid engine configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl StatsError {
    /// Whether this is a batch failure the caller should report.
    pub fn is_batch_failure(&self) -> bool {
        matches!(self, Self::InvalidProjectId(_) | Self::BatchFailed(_))
    }
}
