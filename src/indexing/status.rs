//! Rebuild state machine and outcomes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Lifecycle of the most recent rebuild of one index
///
/// Only `Running` blocks a new rebuild; `Completed` and `Failed` behave like
/// `Idle` apart from what they report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RebuildState {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

/// Pollable snapshot of an index's rebuild state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RebuildStatus {
    pub state: RebuildState,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Documents written by the last successful rebuild
    pub documents_indexed: Option<usize>,

    pub last_error: Option<String>,

    /// Marker-cache reading: true when no rebuild marker is present. May
    /// report completion early if the marker was evicted.
    #[serde(default)]
    pub apparently_complete: bool,
}

impl RebuildStatus {
    pub(crate) fn running() -> Self {
        Self {
            state: RebuildState::Running,
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    pub(crate) fn finish(&mut self, result: Result<usize, String>) {
        self.finished_at = Some(Utc::now());
        match result {
            Ok(documents) => {
                self.state = RebuildState::Completed;
                self.documents_indexed = Some(documents);
                self.last_error = None;
            }
            Err(message) => {
                self.state = RebuildState::Failed;
                self.last_error = Some(message);
            }
        }
    }
}

/// Result of asking for a rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RebuildOutcome {
    /// The rebuild was handed to a background task
    Scheduled,
    /// No index with that name
    UnknownIndex,
    /// The index exists but no populator can rebuild it
    NoPopulator,
    /// A rebuild of this index is already running
    AlreadyRunning,
    /// No runtime was available to run the rebuild
    SchedulingFailed,
}

impl RebuildOutcome {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, RebuildOutcome::Scheduled)
    }

    /// The caller asked for something that cannot be validated, as opposed to
    /// a valid index that is busy
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, RebuildOutcome::UnknownIndex | RebuildOutcome::NoPopulator)
    }
}
