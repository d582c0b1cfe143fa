//! Boundary to the search execution engine

use crate::search::error::SearchResult;
use crate::search::request::SearchRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A document as handed to and returned from an index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    pub id: String,

    /// Unpublished documents are only visible to preview requests
    #[serde(default = "default_published")]
    pub published: bool,

    /// Field name to values
    #[serde(default)]
    pub fields: BTreeMap<String, Vec<String>>,
}

fn default_published() -> bool {
    true
}

impl IndexDocument {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            published: true,
            fields: BTreeMap::new(),
        }
    }

    /// Add a single-valued field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.entry(name.into()).or_default().push(value.into());
        self
    }

    pub fn with_published(mut self, published: bool) -> Self {
        self.published = published;
        self
    }

    pub fn values(&self, field_name: &str) -> &[String] {
        self.fields
            .get(field_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First value of a field
    pub fn first(&self, field_name: &str) -> Option<&str> {
        self.values(field_name).first().map(String::as_str)
    }
}

/// One page of search results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    /// Matches before paging
    pub total: usize,

    pub items: Vec<IndexDocument>,
}

/// Runs a [`SearchRequest`] against some index
///
/// Implementations own filter evaluation, including what range operators mean
/// for non-numeric fields. A filter with sub-filters is a grouping node: only
/// its sub-tree is evaluated.
#[async_trait]
pub trait SearchExecutor: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> SearchResult<SearchResults>;
}
