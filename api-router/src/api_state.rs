use std::sync::Arc;

use common::{
    error::AppError,
    storage::{qdrant::QdrantClient, vector_store::VectorStore},
    utils::config::AppConfig,
};

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn VectorStore>,
}

impl ApiState {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let store = Arc::new(QdrantClient::from_config(config)?);
        Ok(Self::with_store(store))
    }

    pub fn with_store(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }
}
