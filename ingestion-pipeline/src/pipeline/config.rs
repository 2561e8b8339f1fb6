use std::time::Duration;

use common::utils::config::AppConfig;

#[derive(Debug, Clone)]
pub struct IngestionConfig {
    pub extraction_timeout: Duration,
    pub embedding_timeout: Duration,
    /// Ids fetched per scroll request when listing existing points.
    pub scroll_page_size: u32,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            extraction_timeout: Duration::from_secs(60),
            embedding_timeout: Duration::from_secs(120),
            scroll_page_size: 256,
        }
    }
}

impl From<&AppConfig> for IngestionConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            extraction_timeout: config.extraction_timeout(),
            embedding_timeout: config.embedding_timeout(),
            scroll_page_size: config.scroll_page_size.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_timeouts_from_app_config() {
        let app_config = AppConfig {
            extraction_timeout_secs: 5,
            embedding_timeout_secs: 7,
            scroll_page_size: 32,
            ..Default::default()
        };

        let config = IngestionConfig::from(&app_config);
        assert_eq!(config.extraction_timeout, Duration::from_secs(5));
        assert_eq!(config.embedding_timeout, Duration::from_secs(7));
        assert_eq!(config.scroll_page_size, 32);
    }
}
