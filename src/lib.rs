//! Content index manager
//!
//! Parses content-query filter and sort tokens into engine-agnostic search
//! requests, and coordinates exclusive background rebuilds of named indexes.

pub mod api;
pub mod config;
pub mod error;
pub mod indexing;
pub mod metrics;
pub mod scheduler;
pub mod search;

pub use error::{AppError, Result};
