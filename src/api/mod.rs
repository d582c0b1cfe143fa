pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::indexing::{IndexRebuilder, IndexRegistry};
use crate::search::{FilterHandlerRegistry, SearchConfig, SortHandlerRegistry};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub rebuilder: Arc<IndexRebuilder>,
    pub filter_handlers: Arc<FilterHandlerRegistry>,
    pub sort_handlers: Arc<SortHandlerRegistry>,
    pub search_config: SearchConfig,
}

impl AppState {
    /// State with the default filter and sort handlers
    pub fn new(rebuilder: Arc<IndexRebuilder>) -> Self {
        Self {
            rebuilder,
            filter_handlers: Arc::new(FilterHandlerRegistry::default()),
            sort_handlers: Arc::new(SortHandlerRegistry::default()),
            search_config: SearchConfig::default(),
        }
    }

    pub fn with_search_config(mut self, search_config: SearchConfig) -> Self {
        self.search_config = search_config;
        self
    }

    /// Replace the filter handlers, e.g. to add a custom field
    pub fn with_filter_handlers(mut self, filter_handlers: FilterHandlerRegistry) -> Self {
        self.filter_handlers = Arc::new(filter_handlers);
        self
    }

    pub fn registry(&self) -> &Arc<IndexRegistry> {
        self.rebuilder.registry()
    }
}
