//! Cron-driven index rebuilds

use super::error::{SchedulerError, SchedulerResult};
use crate::indexing::IndexRebuilder;
use dashmap::DashMap;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// What a scheduled job rebuilds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildTarget {
    /// Every rebuildable index, optionally only empty ones
    All { only_empty: bool },
    /// One index by name
    Index(String),
}

/// Runs rebuilds on cron schedules (six fields, seconds first)
///
/// Each firing only schedules work through [`IndexRebuilder`]; a firing that
/// finds the index already rebuilding is skipped and logged.
pub struct RebuildScheduler {
    scheduler: JobScheduler,
    rebuilder: Arc<IndexRebuilder>,
    jobs: Arc<DashMap<Uuid, (String, RebuildTarget)>>,
    running: bool,
}

impl RebuildScheduler {
    pub async fn new(rebuilder: Arc<IndexRebuilder>) -> SchedulerResult<Self> {
        info!("Initializing rebuild scheduler");

        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| SchedulerError::StartupFailed(e.to_string()))?;

        Ok(Self {
            scheduler,
            rebuilder,
            jobs: Arc::new(DashMap::new()),
            running: false,
        })
    }

    /// Register a rebuild job on `schedule`
    pub async fn schedule(&self, schedule: &str, target: RebuildTarget) -> SchedulerResult<Uuid> {
        if let RebuildTarget::Index(name) = &target {
            if !self.rebuilder.registry().contains(name) {
                return Err(SchedulerError::UnknownIndex(name.clone()));
            }
        }

        let rebuilder = self.rebuilder.clone();
        let job_target = target.clone();
        let job = Job::new_async(schedule, move |uuid, _l| {
            let rebuilder = rebuilder.clone();
            let target = job_target.clone();
            Box::pin(async move {
                debug!(job_id = %uuid, target = ?target, "Executing scheduled rebuild");
                run_target(&rebuilder, &target).await;
            })
        })
        .map_err(|e: JobSchedulerError| {
            SchedulerError::InvalidCronExpression(format!("{}: {}", schedule, e))
        })?;

        let job_id = job.guid();
        self.scheduler
            .add(job)
            .await
            .map_err(|e| SchedulerError::JobCreationFailed(e.to_string()))?;
        self.jobs.insert(job_id, (schedule.to_string(), target.clone()));

        info!(job_id = %job_id, schedule = %schedule, target = ?target, "Rebuild job scheduled");

        Ok(job_id)
    }

    pub async fn remove(&self, job_id: &Uuid) -> SchedulerResult<()> {
        self.jobs
            .remove(job_id)
            .ok_or_else(|| SchedulerError::JobNotFound(job_id.to_string()))?;

        self.scheduler.remove(job_id).await?;
        info!(job_id = %job_id, "Rebuild job removed");
        Ok(())
    }

    /// Scheduled jobs as `(id, schedule, target)`
    pub fn jobs(&self) -> Vec<(Uuid, String, RebuildTarget)> {
        self.jobs
            .iter()
            .map(|entry| {
                let (schedule, target) = entry.value().clone();
                (*entry.key(), schedule, target)
            })
            .collect()
    }

    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.running {
            warn!("Rebuild scheduler is already running");
            return Ok(());
        }

        self.scheduler
            .start()
            .await
            .map_err(|e| SchedulerError::StartupFailed(e.to_string()))?;
        self.running = true;

        info!(jobs = self.jobs.len(), "Rebuild scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> SchedulerResult<()> {
        if !self.running {
            warn!("Rebuild scheduler is not running");
            return Ok(());
        }

        self.scheduler
            .shutdown()
            .await
            .map_err(|e| SchedulerError::ShutdownFailed(e.to_string()))?;
        self.running = false;

        info!("Rebuild scheduler shut down");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

async fn run_target(rebuilder: &IndexRebuilder, target: &RebuildTarget) {
    match target {
        RebuildTarget::All { only_empty } => {
            for (index, outcome) in rebuilder.rebuild_all(*only_empty).await {
                if !outcome.is_scheduled() {
                    warn!(index = %index, outcome = %outcome, "Scheduled rebuild skipped");
                }
            }
        }
        RebuildTarget::Index(name) => {
            let outcome = rebuilder.try_rebuild(name).await;
            if !outcome.is_scheduled() {
                warn!(index = %name, outcome = %outcome, "Scheduled rebuild skipped");
            }
        }
    }
}
