//! Error types for index population and rebuilds

use crate::search::SearchError;

/// Result type for indexing operations
pub type IndexingResult<T> = std::result::Result<T, IndexingError>;

/// Errors raised while (re)building an index
///
/// Rebuild validation problems (unknown index, rebuild already running) are
/// not errors; they are reported through [`RebuildOutcome`](super::RebuildOutcome).
#[derive(Debug, thiserror::Error)]
pub enum IndexingError {
    /// A populator could not produce or write its documents
    #[error("Population failed ({populator}): {message}")]
    PopulationFailed { populator: String, message: String },

    /// Content source could not be read
    #[error("Content source error: {0}")]
    Source(String),

    /// The rebuild ran longer than the configured limit
    #[error("Rebuild timed out after {0} seconds")]
    Timeout(u64),

    /// The rebuild task panicked
    #[error("Rebuild task panicked: {0}")]
    Panicked(String),

    /// Index operation failed
    #[error(transparent)]
    Search(#[from] SearchError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for IndexingError {
    fn from(err: serde_json::Error) -> Self {
        IndexingError::Source(err.to_string())
    }
}
