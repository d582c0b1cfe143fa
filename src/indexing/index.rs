//! Boundary to a concrete search index

use crate::search::{IndexDocument, SearchExecutor, SearchResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Health as reported by the index provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexHealth {
    pub healthy: bool,
    pub message: String,
}

impl IndexHealth {
    pub fn healthy() -> Self {
        Self {
            healthy: true,
            message: "Healthy".to_string(),
        }
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            healthy: false,
            message: message.into(),
        }
    }
}

/// A named index the rebuild coordinator can list, clear and refill
///
/// Implemented by the search engine integration; the engine's storage and
/// ranking are not this crate's concern.
#[async_trait]
pub trait SearchIndex: SearchExecutor {
    /// Unique index name
    fn name(&self) -> &str;

    /// Name of the searcher that queries this index
    fn searcher_name(&self) -> String {
        format!("{}Searcher", self.name())
    }

    async fn health(&self) -> IndexHealth;

    async fn document_count(&self) -> SearchResult<u64>;

    async fn field_count(&self) -> SearchResult<usize>;

    /// Provider specific key/value pairs shown in the index details
    fn provider_properties(&self) -> BTreeMap<String, serde_json::Value> {
        BTreeMap::new()
    }

    /// Remove every document
    async fn clear(&self) -> SearchResult<()>;

    /// Add or replace documents, returning how many were written
    async fn index_documents(&self, documents: Vec<IndexDocument>) -> SearchResult<usize>;
}

/// Listing and details view of one index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDetails {
    pub name: String,
    pub health_status: String,
    pub is_healthy: bool,
    pub can_rebuild: bool,
    pub is_rebuilding: bool,
    pub searcher_name: String,
    pub document_count: u64,
    pub field_count: usize,
    pub provider_properties: BTreeMap<String, serde_json::Value>,
}

/// The coordinator's view of an index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub name: String,
    pub has_populator: bool,
    pub in_flight: bool,
}
