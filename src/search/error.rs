//! Error types for search operations

use crate::error::AppError;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors raised by search execution and handler construction
///
/// Filter parsing never produces these: malformed tokens become fail-closed
/// filters instead. An unknown index is not an error either; callers look the
/// index up in the registry first.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The request cannot be executed as given
    #[error("Invalid search request: {0}")]
    InvalidRequest(String),

    /// A filter pattern failed to compile or lacks its named groups
    #[error("Invalid filter pattern: {0}")]
    InvalidPattern(String),
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidRequest(msg) => AppError::Validation(msg),
            // Handler patterns are server configuration, not caller input
            SearchError::InvalidPattern(_) => AppError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_app_error_mapping() {
        let err: AppError = SearchError::InvalidRequest("page size must be at least 1".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        let err: AppError = SearchError::InvalidPattern("no `value` group".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
    }
}
