use crate::indexing::IndexingConfig;
use crate::search::SearchConfig;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Search request defaults and limits
    #[serde(default)]
    pub search: SearchConfig,

    /// Index registration and rebuild settings
    #[serde(default)]
    pub indexing: IndexingConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());
        Self::load_from(&config_path)
    }

    /// Load the embedded defaults, then `config_path` if it exists, then the environment
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(config_path).required(false))
            // Override with environment variables (e.g. CIM__SERVER__HTTP_PORT)
            .add_source(
                config::Environment::with_prefix("CIM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            prometheus_enabled: true,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_values() {
        assert_eq!(default_http_port(), 8080);
        assert_eq!(default_log_level(), "info");
        assert!(default_true());
    }

    #[test]
    fn test_embedded_defaults() {
        let config = Config::load_from("/nonexistent/cim.toml").unwrap();

        assert_eq!(config.server.http_port, 8080);
        assert_eq!(config.search.default_page_size, 10);
        assert_eq!(config.indexing.marker_ttl_secs, 300);

        let names: Vec<_> = config.indexing.indexes.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["ExternalIndex", "InternalIndex", "MembersIndex"]);
        assert!(config.indexing.indexes[2].seed_file.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[search]\nmax_page_size = 50\n\n[indexing]\nrebuild_timeout_secs = 0\nrebuild_schedule = \"0 0 3 * * *\""
        )
        .unwrap();

        let config = Config::load_from(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.search.max_page_size, 50);
        assert_eq!(config.search.default_page_size, 10);
        assert_eq!(config.indexing.rebuild_timeout(), None);
        assert_eq!(config.indexing.rebuild_schedule.as_deref(), Some("0 0 3 * * *"));
    }
}
