//! Exclusive, non-blocking index rebuilds

use super::config::IndexingConfig;
use super::error::{IndexingError, IndexingResult};
use super::index::{IndexDescriptor, IndexDetails, SearchIndex};
use super::markers::RebuildMarkers;
use super::populator::IndexPopulator;
use super::registry::IndexRegistry;
use super::status::{RebuildOutcome, RebuildStatus};
use crate::metrics::{
    REBUILDS_COMPLETED_TOTAL, REBUILDS_IN_FLIGHT, REBUILDS_STARTED_TOTAL, REBUILD_DURATION_SECONDS,
    REBUILD_FAILURES_TOTAL,
};
use dashmap::{DashMap, DashSet};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Coordinates rebuilds of the indexes in an [`IndexRegistry`]
///
/// At most one rebuild runs per index name; different indexes rebuild
/// concurrently. A rebuild runs on a tokio task and the index is released when
/// that task ends, whether it succeeded, failed, timed out or panicked.
///
/// Construct once at startup and share it behind an `Arc`.
pub struct IndexRebuilder {
    registry: Arc<IndexRegistry>,
    in_flight: Arc<DashSet<String>>,
    statuses: Arc<DashMap<String, RebuildStatus>>,
    markers: RebuildMarkers,
    timeout: Option<Duration>,
}

impl IndexRebuilder {
    pub fn new(registry: Arc<IndexRegistry>, config: &IndexingConfig) -> Self {
        Self {
            registry,
            in_flight: Arc::new(DashSet::new()),
            statuses: Arc::new(DashMap::new()),
            markers: RebuildMarkers::new(config.marker_capacity, config.marker_ttl()),
            timeout: config.rebuild_timeout(),
        }
    }

    pub fn registry(&self) -> &Arc<IndexRegistry> {
        &self.registry
    }

    /// True when the index is registered and some populator can rebuild it
    pub fn can_rebuild(&self, index_name: &str) -> bool {
        self.registry
            .get(index_name)
            .map(|index| self.registry.has_populator(index.as_ref()))
            .unwrap_or(false)
    }

    /// True while a rebuild task holds the index
    pub fn is_rebuilding(&self, index_name: &str) -> bool {
        self.in_flight.contains(index_name)
    }

    pub fn descriptor(&self, index_name: &str) -> Option<IndexDescriptor> {
        let index = self.registry.get(index_name)?;
        Some(IndexDescriptor {
            name: index_name.to_string(),
            has_populator: self.registry.has_populator(index.as_ref()),
            in_flight: self.is_rebuilding(index_name),
        })
    }

    /// Start a background rebuild of `index_name` unless one is already running
    ///
    /// Returns as soon as the work is scheduled.
    pub async fn try_rebuild(&self, index_name: &str) -> RebuildOutcome {
        let Some(index) = self.registry.get(index_name) else {
            warn!(index = %index_name, "Rebuild requested for unknown index");
            return RebuildOutcome::UnknownIndex;
        };

        let populators = self.registry.populators_for(index.as_ref());
        if populators.is_empty() {
            warn!(index = %index_name, "No populator registered for index");
            return RebuildOutcome::NoPopulator;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            error!(index = %index_name, "No async runtime available to run rebuild");
            return RebuildOutcome::SchedulingFailed;
        };

        if !self.in_flight.insert(index_name.to_string()) {
            info!(index = %index_name, "Rebuild already running");
            return RebuildOutcome::AlreadyRunning;
        }
        let guard = InFlightGuard::new(index_name, self.in_flight.clone());

        self.markers.mark(index_name).await;
        self.statuses
            .insert(index_name.to_string(), RebuildStatus::running());
        REBUILDS_STARTED_TOTAL.with_label_values(&[index_name]).inc();

        let task = RebuildTask {
            index,
            populators,
            statuses: self.statuses.clone(),
            markers: self.markers.clone(),
            timeout: self.timeout,
        };
        runtime.spawn(task.run(guard));

        info!(index = %index_name, "Rebuild scheduled");
        RebuildOutcome::Scheduled
    }

    /// Best-effort completion check: true when no rebuild marker is present
    ///
    /// A marker can disappear for reasons other than completion (eviction,
    /// expiry), so a `true` reading may be premature. Prefer
    /// [`rebuild_status`](Self::rebuild_status) when the exact state matters.
    pub async fn is_rebuild_complete(&self, index_name: &str) -> bool {
        !self.markers.is_marked(index_name).await
    }

    /// Explicit state of the last rebuild, plus the marker reading
    pub async fn rebuild_status(&self, index_name: &str) -> Option<RebuildStatus> {
        if !self.registry.contains(index_name) {
            return None;
        }

        let mut status = self
            .statuses
            .get(index_name)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        status.apparently_complete = self.is_rebuild_complete(index_name).await;
        Some(status)
    }

    /// Schedule a rebuild of every rebuildable index
    ///
    /// With `only_empty`, indexes that already hold documents are skipped.
    pub async fn rebuild_all(&self, only_empty: bool) -> Vec<(String, RebuildOutcome)> {
        let mut outcomes = Vec::new();

        for name in self.registry.names() {
            if !self.can_rebuild(&name) {
                debug!(index = %name, "Skipping index without populator");
                continue;
            }

            if only_empty {
                if let Some(index) = self.registry.get(&name) {
                    match index.document_count().await {
                        Ok(0) => {}
                        Ok(count) => {
                            debug!(index = %name, documents = count, "Skipping non-empty index");
                            continue;
                        }
                        Err(e) => {
                            warn!(index = %name, error = %e, "Could not count documents, rebuilding");
                        }
                    }
                }
            }

            let outcome = self.try_rebuild(&name).await;
            outcomes.push((name, outcome));
        }

        info!(
            only_empty = only_empty,
            scheduled = outcomes.iter().filter(|(_, o)| o.is_scheduled()).count(),
            "Rebuild of all indexes requested"
        );

        outcomes
    }

    /// Run [`rebuild_all`](Self::rebuild_all) on a background task after `delay`
    pub fn rebuild_all_after(
        self: &Arc<Self>,
        only_empty: bool,
        delay: Duration,
    ) -> JoinHandle<Vec<(String, RebuildOutcome)>> {
        let rebuilder = self.clone();
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            rebuilder.rebuild_all(only_empty).await
        })
    }

    /// Listing/details view of one index
    pub async fn index_details(&self, index_name: &str) -> Option<IndexDetails> {
        let index = self.registry.get(index_name)?;
        let health = index.health().await;

        let document_count = index.document_count().await.unwrap_or_else(|e| {
            warn!(index = %index_name, error = %e, "Could not count documents");
            0
        });
        let field_count = index.field_count().await.unwrap_or_else(|e| {
            warn!(index = %index_name, error = %e, "Could not count fields");
            0
        });

        Some(IndexDetails {
            name: index_name.to_string(),
            health_status: health.message,
            is_healthy: health.healthy,
            can_rebuild: self.registry.has_populator(index.as_ref()),
            is_rebuilding: self.is_rebuilding(index_name),
            searcher_name: index.searcher_name(),
            document_count,
            field_count,
            provider_properties: index.provider_properties(),
        })
    }

    /// One page of index details, sorted by name, with the total count
    pub async fn list_indexes(&self, skip: usize, take: usize) -> (usize, Vec<IndexDetails>) {
        let names = self.registry.names();
        let total = names.len();

        let mut page = Vec::new();
        for name in names.into_iter().skip(skip).take(take) {
            if let Some(details) = self.index_details(&name).await {
                page.push(details);
            }
        }

        (total, page)
    }
}

/// Removes the index from the in-flight set when dropped
struct InFlightGuard {
    index_name: String,
    in_flight: Arc<DashSet<String>>,
}

impl InFlightGuard {
    fn new(index_name: &str, in_flight: Arc<DashSet<String>>) -> Self {
        REBUILDS_IN_FLIGHT.inc();
        Self {
            index_name: index_name.to_string(),
            in_flight,
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.remove(&self.index_name);
        REBUILDS_IN_FLIGHT.dec();
        debug!(index = %self.index_name, "Index released");
    }
}

struct RebuildTask {
    index: Arc<dyn SearchIndex>,
    populators: Vec<Arc<dyn IndexPopulator>>,
    statuses: Arc<DashMap<String, RebuildStatus>>,
    markers: RebuildMarkers,
    timeout: Option<Duration>,
}

impl RebuildTask {
    async fn run(self, _guard: InFlightGuard) {
        let name = self.index.name().to_string();
        let start = Instant::now();

        info!(index = %name, populators = self.populators.len(), "Index rebuild started");

        let work = AssertUnwindSafe(populate(self.index.as_ref(), &self.populators)).catch_unwind();
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, work).await {
                Ok(outcome) => outcome,
                Err(_) => Ok(Err(IndexingError::Timeout(limit.as_secs()))),
            },
            None => work.await,
        };
        let result = outcome.unwrap_or_else(|payload| Err(IndexingError::Panicked(panic_message(payload))));

        let duration = start.elapsed();
        REBUILD_DURATION_SECONDS
            .with_label_values(&[name.as_str()])
            .observe(duration.as_secs_f64());

        match &result {
            Ok(documents) => {
                REBUILDS_COMPLETED_TOTAL.with_label_values(&[name.as_str()]).inc();
                info!(
                    index = %name,
                    documents = documents,
                    duration_ms = duration.as_millis(),
                    "Index rebuild completed"
                );
            }
            Err(e) => {
                REBUILD_FAILURES_TOTAL.with_label_values(&[name.as_str()]).inc();
                error!(
                    index = %name,
                    error = %e,
                    duration_ms = duration.as_millis(),
                    "Index rebuild failed"
                );
            }
        }

        if let Some(mut status) = self.statuses.get_mut(&name) {
            status.finish(result.map_err(|e| e.to_string()));
        }
        self.markers.clear(&name).await;
    }
}

async fn populate(index: &dyn SearchIndex, populators: &[Arc<dyn IndexPopulator>]) -> IndexingResult<usize> {
    index.clear().await?;

    let mut written = 0;
    for populator in populators {
        written += populator.populate(index).await?;
    }
    Ok(written)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
