//! Error types for the scheduler module

/// Result type for scheduler operations
pub type SchedulerResult<T> = std::result::Result<T, SchedulerError>;

/// Errors that can occur in scheduler operations
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// Scheduler failed to start
    #[error("Failed to start scheduler: {0}")]
    StartupFailed(String),

    /// Scheduler failed to shutdown
    #[error("Failed to shutdown scheduler: {0}")]
    ShutdownFailed(String),

    /// Job creation failed
    #[error("Failed to create job: {0}")]
    JobCreationFailed(String),

    /// Job not found
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Invalid cron expression
    #[error("Invalid cron expression: {0}")]
    InvalidCronExpression(String),

    /// Scheduled rebuild names an index that is not registered
    #[error("Unknown index: {0}")]
    UnknownIndex(String),

    /// Internal scheduler error
    #[error("Internal scheduler error: {0}")]
    InternalError(String),
}

impl From<tokio_cron_scheduler::JobSchedulerError> for SchedulerError {
    fn from(err: tokio_cron_scheduler::JobSchedulerError) -> Self {
        SchedulerError::InternalError(format!("tokio-cron-scheduler error: {}", err))
    }
}
