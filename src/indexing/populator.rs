//! Index populators and the content sources that feed them

use super::error::{IndexingError, IndexingResult};
use super::index::SearchIndex;
use crate::search::IndexDocument;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Component able to fill an index from its source of truth
#[async_trait]
pub trait IndexPopulator: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this populator knows how to fill `index`
    fn is_registered(&self, index: &dyn SearchIndex) -> bool;

    /// Write every document for `index`, returning how many were written
    async fn populate(&self, index: &dyn SearchIndex) -> IndexingResult<usize>;
}

/// Where a populator reads its documents from
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Short description for logs
    fn describe(&self) -> String;

    async fn load(&self) -> IndexingResult<Vec<IndexDocument>>;
}

/// Fixed set of documents held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticContentSource {
    documents: Vec<IndexDocument>,
}

impl StaticContentSource {
    pub fn new(documents: Vec<IndexDocument>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl ContentSource for StaticContentSource {
    fn describe(&self) -> String {
        format!("static ({} documents)", self.documents.len())
    }

    async fn load(&self) -> IndexingResult<Vec<IndexDocument>> {
        Ok(self.documents.clone())
    }
}

/// JSON file holding an array of documents, read on every rebuild
#[derive(Debug, Clone)]
pub struct JsonFileContentSource {
    path: PathBuf,
}

impl JsonFileContentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ContentSource for JsonFileContentSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn load(&self) -> IndexingResult<Vec<IndexDocument>> {
        let raw = tokio::fs::read(&self.path).await?;
        let documents: Vec<IndexDocument> = serde_json::from_slice(&raw)?;
        debug!(path = %self.path.display(), count = documents.len(), "Loaded content source");
        Ok(documents)
    }
}

/// Populates a named set of indexes from one content source
pub struct ContentPopulator {
    name: String,
    index_names: BTreeSet<String>,
    source: Arc<dyn ContentSource>,
    batch_size: usize,
}

impl ContentPopulator {
    pub fn new(name: impl Into<String>, source: Arc<dyn ContentSource>) -> Self {
        Self {
            name: name.into(),
            index_names: BTreeSet::new(),
            source,
            batch_size: 500,
        }
    }

    /// Register an index this populator fills
    pub fn for_index(mut self, index_name: impl Into<String>) -> Self {
        self.index_names.insert(index_name.into());
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

#[async_trait]
impl IndexPopulator for ContentPopulator {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_registered(&self, index: &dyn SearchIndex) -> bool {
        self.index_names.contains(index.name())
    }

    async fn populate(&self, index: &dyn SearchIndex) -> IndexingResult<usize> {
        let documents = self.source.load().await.map_err(|e| IndexingError::PopulationFailed {
            populator: self.name.clone(),
            message: e.to_string(),
        })?;

        let mut written = 0;
        for batch in documents.chunks(self.batch_size) {
            written += index.index_documents(batch.to_vec()).await?;
        }

        info!(
            populator = %self.name,
            index = index.name(),
            source = %self.source.describe(),
            documents = written,
            "Index populated"
        );

        Ok(written)
    }
}
