//! Index registry and rebuild coordination
//!
//! Indexes are registered by name together with the populators able to fill
//! them. [`IndexRebuilder`] runs rebuilds on background tasks, one at a time
//! per index:
//! - `try_rebuild` validates the request and returns without waiting for the work
//! - a rebuild that fails, times out or panics still releases its index
//! - completion can be polled through explicit status or an expiring marker

pub mod config;
pub mod error;
pub mod index;
pub mod markers;
pub mod populator;
pub mod rebuilder;
pub mod registry;
pub mod status;

pub use config::{IndexDefinition, IndexingConfig, IndexingConfigBuilder};
pub use error::{IndexingError, IndexingResult};
pub use index::{IndexDescriptor, IndexDetails, IndexHealth, SearchIndex};
pub use markers::RebuildMarkers;
pub use populator::{
    ContentPopulator, ContentSource, IndexPopulator, JsonFileContentSource, StaticContentSource,
};
pub use rebuilder::IndexRebuilder;
pub use registry::IndexRegistry;
pub use status::{RebuildOutcome, RebuildState, RebuildStatus};
