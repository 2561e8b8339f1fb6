use std::{fmt, time::Duration};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use super::embedding::EmbeddingBackend;

#[derive(Clone, Deserialize)]
pub struct AppConfig {
    #[serde(rename = "qdrant__service__host")]
    pub qdrant_host: String,
    #[serde(rename = "qdrant__service__port")]
    pub qdrant_port: u16,
    #[serde(rename = "qdrant__service__api_key")]
    pub qdrant_api_key: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_store_timeout_secs")]
    pub store_timeout_secs: u64,
    #[serde(default = "default_embedding_timeout_secs")]
    pub embedding_timeout_secs: u64,
    #[serde(default = "default_extraction_timeout_secs")]
    pub extraction_timeout_secs: u64,
    #[serde(default = "default_scroll_page_size")]
    pub scroll_page_size: u32,
    #[serde(default)]
    pub embedding_backend: EmbeddingBackend,
    #[serde(default)]
    pub embedding_model: Option<String>,
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,
}

fn default_http_port() -> u16 {
    8000
}

fn default_store_timeout_secs() -> u64 {
    30
}

fn default_embedding_timeout_secs() -> u64 {
    120
}

fn default_extraction_timeout_secs() -> u64 {
    60
}

fn default_scroll_page_size() -> u32 {
    256
}

fn default_embedding_dimension() -> usize {
    384
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            qdrant_host: "localhost".to_string(),
            qdrant_port: 6333,
            qdrant_api_key: String::new(),
            http_port: default_http_port(),
            store_timeout_secs: default_store_timeout_secs(),
            embedding_timeout_secs: default_embedding_timeout_secs(),
            extraction_timeout_secs: default_extraction_timeout_secs(),
            scroll_page_size: default_scroll_page_size(),
            embedding_backend: EmbeddingBackend::default(),
            embedding_model: None,
            embedding_dimension: default_embedding_dimension(),
        }
    }
}

// The API key never reaches logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("qdrant_host", &self.qdrant_host)
            .field("qdrant_port", &self.qdrant_port)
            .field("qdrant_api_key", &"<redacted>")
            .field("http_port", &self.http_port)
            .field("store_timeout_secs", &self.store_timeout_secs)
            .field("embedding_timeout_secs", &self.embedding_timeout_secs)
            .field("extraction_timeout_secs", &self.extraction_timeout_secs)
            .field("scroll_page_size", &self.scroll_page_size)
            .field("embedding_backend", &self.embedding_backend)
            .field("embedding_model", &self.embedding_model)
            .field("embedding_dimension", &self.embedding_dimension)
            .finish()
    }
}

impl AppConfig {
    pub fn qdrant_url(&self) -> String {
        format!("http://{}:{}", self.qdrant_host, self.qdrant_port)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embedding_timeout_secs)
    }

    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Rejects settings the process cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.qdrant_host.trim().is_empty() {
            return Err(ConfigError::Message(
                "QDRANT__SERVICE__HOST must not be empty".into(),
            ));
        }
        if self.qdrant_port == 0 {
            return Err(ConfigError::Message(
                "QDRANT__SERVICE__PORT must be a non-zero port".into(),
            ));
        }
        if self.qdrant_api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "QDRANT__SERVICE__API_KEY must not be empty".into(),
            ));
        }
        if self.scroll_page_size == 0 {
            return Err(ConfigError::Message(
                "SCROLL_PAGE_SIZE must be greater than zero".into(),
            ));
        }
        for (name, secs) in [
            ("STORE_TIMEOUT_SECS", self.store_timeout_secs),
            ("EMBEDDING_TIMEOUT_SECS", self.embedding_timeout_secs),
            ("EXTRACTION_TIMEOUT_SECS", self.extraction_timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::Message(format!(
                    "{name} must be greater than zero"
                )));
            }
        }
        Ok(())
    }
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    // A missing .env is fine; the environment may already be populated.
    dotenvy::dotenv().ok();

    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;
    app_config.validate()?;

    Ok(app_config)
}
