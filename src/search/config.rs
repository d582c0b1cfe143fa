//! Search configuration

use serde::{Deserialize, Serialize};

/// Search request defaults and limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Page size used when a request does not name one
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Largest page size a caller may request
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl SearchConfig {
    /// Clamp a requested page size into `1..=max_page_size`
    pub fn clamp_page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}

fn default_page_size() -> usize {
    10
}

fn default_max_page_size() -> usize {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_page_size() {
        let config = SearchConfig {
            default_page_size: 20,
            max_page_size: 100,
        };

        assert_eq!(config.clamp_page_size(None), 20);
        assert_eq!(config.clamp_page_size(Some(0)), 1);
        assert_eq!(config.clamp_page_size(Some(50)), 50);
        assert_eq!(config.clamp_page_size(Some(5000)), 100);
    }
}
