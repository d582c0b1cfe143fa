//! Tests for cron-driven rebuilds

use async_trait::async_trait;
use content_index_manager::indexing::*;
use content_index_manager::scheduler::{RebuildScheduler, RebuildTarget, SchedulerError};
use content_index_manager::search::{IndexDocument, InMemoryIndex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct CountingPopulator {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl IndexPopulator for CountingPopulator {
    fn name(&self) -> &str {
        "counting"
    }

    fn is_registered(&self, index: &dyn SearchIndex) -> bool {
        index.name() == "ExternalIndex"
    }

    async fn populate(&self, index: &dyn SearchIndex) -> IndexingResult<usize> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(index
            .index_documents(vec![IndexDocument::new("1").with_field("name", "Home")])
            .await?)
    }
}

fn rebuilder_with_counter() -> (Arc<IndexRebuilder>, Arc<AtomicUsize>) {
    let registry = Arc::new(IndexRegistry::new());
    registry.register_index(Arc::new(InMemoryIndex::new("ExternalIndex")));
    registry.register_index(Arc::new(InMemoryIndex::new("MembersIndex")));

    let calls = Arc::new(AtomicUsize::new(0));
    registry.register_populator(Arc::new(CountingPopulator {
        calls: calls.clone(),
    }));

    (
        Arc::new(IndexRebuilder::new(registry, &IndexingConfig::default())),
        calls,
    )
}

#[tokio::test]
async fn test_start_and_shutdown() {
    let (rebuilder, _) = rebuilder_with_counter();
    let mut scheduler = RebuildScheduler::new(rebuilder).await.unwrap();

    assert!(!scheduler.is_running());
    scheduler.start().await.unwrap();
    assert!(scheduler.is_running());

    // A second start is a no-op
    scheduler.start().await.unwrap();

    scheduler.shutdown().await.unwrap();
    assert!(!scheduler.is_running());
}

#[tokio::test]
async fn test_invalid_cron_expression() {
    let (rebuilder, _) = rebuilder_with_counter();
    let scheduler = RebuildScheduler::new(rebuilder).await.unwrap();

    let err = scheduler
        .schedule("not a schedule", RebuildTarget::All { only_empty: false })
        .await
        .unwrap_err();

    assert!(matches!(err, SchedulerError::InvalidCronExpression(_)));
    assert!(scheduler.jobs().is_empty());
}

#[tokio::test]
async fn test_unknown_index_is_rejected() {
    let (rebuilder, _) = rebuilder_with_counter();
    let scheduler = RebuildScheduler::new(rebuilder).await.unwrap();

    let err = scheduler
        .schedule("0 0 3 * * *", RebuildTarget::Index("Nope".to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, SchedulerError::UnknownIndex(name) if name == "Nope"));
}

#[tokio::test]
async fn test_schedule_and_remove() {
    let (rebuilder, _) = rebuilder_with_counter();
    let scheduler = RebuildScheduler::new(rebuilder).await.unwrap();

    let job_id = scheduler
        .schedule("0 0 3 * * *", RebuildTarget::Index("ExternalIndex".to_string()))
        .await
        .unwrap();

    let jobs = scheduler.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].0, job_id);
    assert_eq!(jobs[0].1, "0 0 3 * * *");
    assert_eq!(jobs[0].2, RebuildTarget::Index("ExternalIndex".to_string()));

    scheduler.remove(&job_id).await.unwrap();
    assert!(scheduler.jobs().is_empty());

    let err = scheduler.remove(&job_id).await.unwrap_err();
    assert!(matches!(err, SchedulerError::JobNotFound(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_scheduled_job_rebuilds_index() {
    let (rebuilder, calls) = rebuilder_with_counter();
    let mut scheduler = RebuildScheduler::new(rebuilder.clone()).await.unwrap();

    scheduler
        .schedule("* * * * * *", RebuildTarget::Index("ExternalIndex".to_string()))
        .await
        .unwrap();
    scheduler.start().await.unwrap();

    for _ in 0..50 {
        if calls.load(Ordering::SeqCst) > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    scheduler.shutdown().await.unwrap();

    assert!(calls.load(Ordering::SeqCst) >= 1, "job never fired");

    let index = rebuilder.registry().get("ExternalIndex").unwrap();
    for _ in 0..50 {
        if index.document_count().await.unwrap() == 1 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("scheduled rebuild did not populate the index");
}
