//! Expiring rebuild markers backing the completion heuristic

use chrono::{DateTime, Utc};
use moka::future::Cache;
use std::time::Duration;

/// Per-index "rebuild in progress" markers with a time-to-live
///
/// A marker is set when a rebuild starts and removed when it ends. A missing
/// marker is read as "the rebuild has probably finished". That reading is
/// best effort: the cache may evict a marker early (capacity, TTL) and a very
/// fast rebuild can finish before anyone looks.
#[derive(Clone)]
pub struct RebuildMarkers {
    cache: Cache<String, DateTime<Utc>>,
}

impl RebuildMarkers {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    fn key(index_name: &str) -> String {
        format!("temp_indexing_op_{}", index_name)
    }

    pub async fn mark(&self, index_name: &str) {
        self.cache.insert(Self::key(index_name), Utc::now()).await;
    }

    pub async fn clear(&self, index_name: &str) {
        self.cache.invalidate(&Self::key(index_name)).await;
    }

    /// When the marker for `index_name` was set, if it is still present
    pub async fn marked_at(&self, index_name: &str) -> Option<DateTime<Utc>> {
        self.cache.get(&Self::key(index_name)).await
    }

    pub async fn is_marked(&self, index_name: &str) -> bool {
        self.marked_at(index_name).await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mark_and_clear() {
        let markers = RebuildMarkers::new(100, Duration::from_secs(60));

        markers.mark("ExternalIndex").await;
        assert!(markers.is_marked("ExternalIndex").await);
        assert!(!markers.is_marked("InternalIndex").await);

        markers.clear("ExternalIndex").await;
        assert!(!markers.is_marked("ExternalIndex").await);
    }

    #[tokio::test]
    async fn test_marker_expires() {
        let markers = RebuildMarkers::new(100, Duration::from_millis(100));

        markers.mark("ExternalIndex").await;
        assert!(markers.is_marked("ExternalIndex").await);

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(!markers.is_marked("ExternalIndex").await);
    }
}
