//! Periodic index rebuilds using tokio-cron-scheduler
//!
//! # Example
//!
//! ```no_run
//! use content_index_manager::indexing::{IndexRebuilder, IndexRegistry, IndexingConfig};
//! use content_index_manager::scheduler::{RebuildScheduler, RebuildTarget};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(IndexRegistry::new());
//!     let rebuilder = Arc::new(IndexRebuilder::new(registry, &IndexingConfig::default()));
//!
//!     let mut scheduler = RebuildScheduler::new(rebuilder).await?;
//!     scheduler
//!         .schedule("0 0 3 * * *", RebuildTarget::All { only_empty: false })
//!         .await?;
//!     scheduler.start().await?;
//!
//!     // Scheduler runs in background
//!     tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
//!
//!     scheduler.shutdown().await?;
//!     Ok(())
//! }
//! ```

mod core;
mod error;

pub use core::{RebuildScheduler, RebuildTarget};
pub use error::{SchedulerError, SchedulerResult};
