//! Content query parsing and search request building
//!
//! Raw filter tokens such as `contentType:blogPost`, `name:!Home` or
//! `createDate>:2024-01-01` are turned into [`FilterOption`]s by an ordered
//! [`FilterHandlerRegistry`]. A handler that claims a token always produces a
//! filter; a token it claims but cannot read becomes a filter that matches
//! nothing rather than an error. Sort tokens (`name:asc`, `updateDate:desc`)
//! go through a [`SortHandlerRegistry`] in the same way.
//!
//! # Architecture
//!
//! ```text
//! tokens ──► FilterHandlerRegistry ──► FilterOption tree ─┐
//!        └─► SortHandlerRegistry   ──► SearchSort list   ─┴─► SearchRequest ──► SearchExecutor
//! ```
//!
//! # Example
//!
//! ```no_run
//! use content_index_manager::search::{
//!     FilterHandlerRegistry, SearchRequest, SortHandlerRegistry,
//! };
//!
//! let compiled = SearchRequest::from_tokens(
//!     "release",
//!     ["contentType:blogPost", "updateDate>:2024-01-01"],
//!     ["updateDate:desc"],
//!     &FilterHandlerRegistry::default(),
//!     &SortHandlerRegistry::default(),
//! );
//! assert_eq!(compiled.request.filters.len(), 2);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod fields;
pub mod filter;
pub mod handlers;
pub mod memory;
pub mod request;

pub use config::SearchConfig;
pub use engine::{IndexDocument, SearchExecutor, SearchResults};
pub use error::{SearchError, SearchResult};
pub use filter::{FilterOperation, FilterOption, LogicOperator};
pub use handlers::{
    operation_for_token, ContentTypeFilter, FilterHandler, FilterHandlerRegistry, NameFilter,
    OperatorMatch, ParsedFilters, ParsedSorts, RegexFilterHandler, SortHandler,
    SortHandlerRegistry,
};
pub use memory::InMemoryIndex;
pub use request::{CompiledRequest, SearchRequest, SearchSort, SortType};
