use std::{collections::HashSet, path::Path, sync::Arc};

use async_trait::async_trait;
use common::{
    error::AppError,
    storage::{
        types::{
            payload::TenantId,
            point::{Point, PointId},
        },
        vector_store::VectorStore,
    },
    utils::embedding::EmbeddingProvider,
};
use tokio::time::timeout;

use super::{config::IngestionConfig, existing_points::list_existing};
use crate::utils::{
    document_source::{list_pdf_documents, SourceDocument},
    pdf_extraction::{PdfTextExtractor, TextExtractor},
};

/// External work the ingestion pipeline depends on.
#[async_trait]
pub trait PipelineServices: Send + Sync {
    async fn list_documents(&self, folder: &Path) -> Result<Vec<SourceDocument>, AppError>;

    /// Size of the collection's vector, `None` when the collection uses named
    /// vectors.
    async fn collection_vector_size(&self, collection: &str) -> Result<Option<u64>, AppError>;

    async fn list_existing(
        &self,
        collection: &str,
        tenant: &TenantId,
    ) -> Result<HashSet<PointId>, AppError>;

    async fn extract_text(&self, document: &SourceDocument) -> Result<String, AppError>;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError>;

    async fn upsert_point(&self, collection: &str, point: Point) -> Result<(), AppError>;
}

pub struct DefaultPipelineServices {
    store: Arc<dyn VectorStore>,
    extractor: Arc<dyn TextExtractor>,
    embedding_provider: Arc<EmbeddingProvider>,
    config: IngestionConfig,
}

impl DefaultPipelineServices {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedding_provider: Arc<EmbeddingProvider>,
        config: IngestionConfig,
    ) -> Self {
        Self::with_extractor(store, Arc::new(PdfTextExtractor), embedding_provider, config)
    }

    pub fn with_extractor(
        store: Arc<dyn VectorStore>,
        extractor: Arc<dyn TextExtractor>,
        embedding_provider: Arc<EmbeddingProvider>,
        config: IngestionConfig,
    ) -> Self {
        Self {
            store,
            extractor,
            embedding_provider,
            config,
        }
    }
}

#[async_trait]
impl PipelineServices for DefaultPipelineServices {
    async fn list_documents(&self, folder: &Path) -> Result<Vec<SourceDocument>, AppError> {
        list_pdf_documents(folder).await
    }

    async fn collection_vector_size(&self, collection: &str) -> Result<Option<u64>, AppError> {
        let info = self.store.collection_info(collection).await?;
        Ok(info.result.vector_size())
    }

    async fn list_existing(
        &self,
        collection: &str,
        tenant: &TenantId,
    ) -> Result<HashSet<PointId>, AppError> {
        list_existing(
            self.store.as_ref(),
            collection,
            tenant,
            self.config.scroll_page_size,
        )
        .await
    }

    async fn extract_text(&self, document: &SourceDocument) -> Result<String, AppError> {
        timeout(
            self.config.extraction_timeout,
            self.extractor.extract(&document.path),
        )
        .await
        .map_err(|_| {
            AppError::Extraction(format!(
                "extraction timed out after {}ms",
                self.config.extraction_timeout.as_millis()
            ))
        })?
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        timeout(
            self.config.embedding_timeout,
            self.embedding_provider.embed(text),
        )
        .await
        .map_err(|_| {
            AppError::Embedding(format!(
                "embedding timed out after {}ms",
                self.config.embedding_timeout.as_millis()
            ))
        })?
        .map_err(|err| AppError::Embedding(err.to_string()))
    }

    async fn upsert_point(&self, collection: &str, point: Point) -> Result<(), AppError> {
        self.store.upsert(collection, vec![point]).await
    }
}
