mod config;
mod context;
mod existing_points;
mod report;
mod services;
mod stages;
mod state;

pub use config::IngestionConfig;
pub use existing_points::list_existing;
pub use report::{IngestionReport, IngestionRequest, SkipReason, SkippedDocument};
#[allow(clippy::module_name_repetitions)]
pub use services::{DefaultPipelineServices, PipelineServices};

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use common::{
    error::AppError,
    storage::vector_store::VectorStore,
    utils::{config::AppConfig, embedding::EmbeddingProvider},
};
use tracing::{info, warn};

use self::{
    context::PipelineContext,
    stages::{embed, extract, upsert, StageError, Upserted},
    state::discovered,
};
use crate::utils::document_source::SourceDocument;

#[allow(clippy::module_name_repetitions)]
pub struct IngestionPipeline {
    pipeline_config: IngestionConfig,
    services: Arc<dyn PipelineServices>,
}

impl IngestionPipeline {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedding_provider: Arc<EmbeddingProvider>,
        config: &AppConfig,
    ) -> Self {
        let pipeline_config = IngestionConfig::from(config);
        let services =
            DefaultPipelineServices::new(store, embedding_provider, pipeline_config.clone());
        Self::with_services(pipeline_config, Arc::new(services))
    }

    pub fn with_services(
        pipeline_config: IngestionConfig,
        services: Arc<dyn PipelineServices>,
    ) -> Self {
        Self {
            pipeline_config,
            services,
        }
    }

    fn duration_millis(duration: Duration) -> u64 {
        u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
    }

    /// Ingests every `.pdf` in the request folder into the collection.
    ///
    /// A failing document is recorded in the report and the run moves on.
    /// The run itself fails on invalid input, a missing collection, or an
    /// existing-point lookup that fails for a reason other than the store
    /// being unreachable.
    #[tracing::instrument(
        skip_all,
        fields(
            collection = %request.collection,
            tenant_id = %request.tenant_id,
            folder = %request.folder.display()
        )
    )]
    pub async fn ingest(&self, request: &IngestionRequest) -> Result<IngestionReport, AppError> {
        request.validate()?;

        let mut ctx = PipelineContext::new(request, self.services.as_ref());
        let started = Instant::now();

        ctx.vector_size = match ctx.services.collection_vector_size(&request.collection).await {
            Ok(size) => size,
            Err(err) if err.is_unavailable() => {
                warn!(
                    collection = %request.collection,
                    error = %err,
                    "Could not read collection vector size; skipping dimension check"
                );
                None
            }
            Err(err) => return Err(ctx.abort(err)),
        };

        match ctx
            .services
            .list_existing(&request.collection, &request.tenant_id)
            .await
        {
            Ok(existing) => ctx.existing = existing,
            Err(err) if err.is_unavailable() => {
                warn!(
                    collection = %request.collection,
                    tenant_id = %request.tenant_id,
                    error = %err,
                    "Existing points unavailable; treating every document as new"
                );
                ctx.report.existing_lookup_degraded = true;
            }
            Err(err) => return Err(ctx.abort(err)),
        }

        let documents = ctx
            .services
            .list_documents(&request.folder)
            .await
            .map_err(|err| ctx.abort(err))?;

        info!(
            collection = %request.collection,
            tenant_id = %request.tenant_id,
            documents = documents.len(),
            existing = ctx.existing.len(),
            extraction_timeout_secs = self.pipeline_config.extraction_timeout.as_secs(),
            embedding_timeout_secs = self.pipeline_config.embedding_timeout.as_secs(),
            "ingestion run started"
        );

        for document in &documents {
            Self::process_document(&mut ctx, document).await?;
        }

        info!(
            collection = %request.collection,
            tenant_id = %request.tenant_id,
            inserted = ctx.report.inserted.len(),
            updated = ctx.report.updated.len(),
            skipped = ctx.report.skipped.len(),
            existing_lookup_degraded = ctx.report.existing_lookup_degraded,
            total_ms = Self::duration_millis(started.elapsed()),
            "ingestion run finished"
        );

        Ok(ctx.report)
    }

    async fn process_document(
        ctx: &mut PipelineContext<'_>,
        document: &SourceDocument,
    ) -> Result<(), AppError> {
        let outcome = Self::drive_document(ctx, document).await;

        match outcome {
            Ok(Upserted::Inserted(point_id)) => {
                info!(
                    file_name = %document.file_name,
                    point_id = %point_id,
                    "document inserted"
                );
                ctx.report.inserted.push(document.file_name.clone());
            }
            Ok(Upserted::Updated(point_id)) => {
                info!(
                    file_name = %document.file_name,
                    point_id = %point_id,
                    "document updated"
                );
                ctx.report.updated.push(document.file_name.clone());
            }
            Err(StageError::Skipped(skipped)) => {
                warn!(
                    file_name = %skipped.file,
                    collection = %ctx.request.collection,
                    tenant_id = %ctx.request.tenant_id,
                    reason = %skipped.reason,
                    detail = %skipped.detail,
                    "document skipped"
                );
                ctx.report.skipped.push(skipped);
            }
            Err(StageError::Fatal(err)) => return Err(ctx.abort(err)),
        }
        Ok(())
    }

    async fn drive_document(
        ctx: &PipelineContext<'_>,
        document: &SourceDocument,
    ) -> Result<Upserted, StageError> {
        let machine = discovered();
        let (machine, text) = extract(machine, ctx, document).await?;
        let (machine, vector) = embed(machine, ctx, document, &text).await?;
        upsert(machine, ctx, document, vector).await
    }
}
