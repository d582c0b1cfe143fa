//! Index rebuild configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Settings for the rebuild coordinator and startup/scheduled rebuilds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Rebuild indexes when the server starts
    #[serde(default = "default_true")]
    pub rebuild_on_startup: bool,

    /// On startup, only rebuild indexes that hold no documents
    #[serde(default = "default_true")]
    pub only_empty_on_startup: bool,

    /// Delay before the startup rebuild (milliseconds)
    #[serde(default = "default_startup_delay")]
    pub startup_delay_ms: u64,

    /// Lifetime of a rebuild marker (seconds)
    #[serde(default = "default_marker_ttl")]
    pub marker_ttl_secs: u64,

    /// Maximum number of rebuild markers kept
    #[serde(default = "default_marker_capacity")]
    pub marker_capacity: u64,

    /// Abort a rebuild after this many seconds; 0 disables the limit
    #[serde(default = "default_rebuild_timeout")]
    pub rebuild_timeout_secs: u64,

    /// Cron expression (with seconds) for periodic full rebuilds
    #[serde(default)]
    pub rebuild_schedule: Option<String>,

    /// Indexes to register at startup
    #[serde(default)]
    pub indexes: Vec<IndexDefinition>,
}

/// One index registered at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub name: String,

    /// Searcher name shown in listings, defaults to `<name>Searcher`
    #[serde(default)]
    pub searcher_name: Option<String>,

    /// JSON file the index is populated from; no file means no populator
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            rebuild_on_startup: true,
            only_empty_on_startup: true,
            startup_delay_ms: default_startup_delay(),
            marker_ttl_secs: default_marker_ttl(),
            marker_capacity: default_marker_capacity(),
            rebuild_timeout_secs: default_rebuild_timeout(),
            rebuild_schedule: None,
            indexes: Vec::new(),
        }
    }
}

impl IndexingConfig {
    pub fn marker_ttl(&self) -> Duration {
        Duration::from_secs(self.marker_ttl_secs)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    pub fn rebuild_timeout(&self) -> Option<Duration> {
        (self.rebuild_timeout_secs > 0).then(|| Duration::from_secs(self.rebuild_timeout_secs))
    }
}

/// Builder for IndexingConfig
pub struct IndexingConfigBuilder {
    config: IndexingConfig,
}

impl IndexingConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: IndexingConfig::default(),
        }
    }

    pub fn rebuild_on_startup(mut self, enabled: bool) -> Self {
        self.config.rebuild_on_startup = enabled;
        self
    }

    pub fn only_empty_on_startup(mut self, only_empty: bool) -> Self {
        self.config.only_empty_on_startup = only_empty;
        self
    }

    pub fn startup_delay_ms(mut self, delay: u64) -> Self {
        self.config.startup_delay_ms = delay;
        self
    }

    pub fn marker_ttl_secs(mut self, secs: u64) -> Self {
        self.config.marker_ttl_secs = secs;
        self
    }

    pub fn marker_capacity(mut self, capacity: u64) -> Self {
        self.config.marker_capacity = capacity;
        self
    }

    pub fn rebuild_timeout_secs(mut self, secs: u64) -> Self {
        self.config.rebuild_timeout_secs = secs;
        self
    }

    pub fn rebuild_schedule(mut self, schedule: impl Into<String>) -> Self {
        self.config.rebuild_schedule = Some(schedule.into());
        self
    }

    pub fn index(mut self, definition: IndexDefinition) -> Self {
        self.config.indexes.push(definition);
        self
    }

    pub fn build(self) -> IndexingConfig {
        self.config
    }
}

impl Default for IndexingConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_true() -> bool {
    true
}

fn default_startup_delay() -> u64 {
    5_000
}

fn default_marker_ttl() -> u64 {
    300 // 5 minutes
}

fn default_marker_capacity() -> u64 {
    1_000
}

fn default_rebuild_timeout() -> u64 {
    3_600
}
