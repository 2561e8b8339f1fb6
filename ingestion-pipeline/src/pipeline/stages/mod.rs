use common::{
    error::AppError,
    storage::types::{
        payload::Payload,
        point::{Point, PointId},
    },
};
use state_machines::core::GuardError;
use tracing::{debug, instrument};

use super::{
    context::PipelineContext,
    report::{SkipReason, SkippedDocument},
    state::{DocumentMachine, Discovered, Embedded, Skipped, TextExtracted},
};
use crate::utils::{document_source::SourceDocument, point_id::derive_point_id};

/// Why a document left the happy path.
pub enum StageError {
    /// The document is recorded as skipped and the run continues.
    Skipped(SkippedDocument),
    /// The run cannot continue.
    Fatal(AppError),
}

pub enum Upserted {
    Inserted(PointId),
    Updated(PointId),
}

#[instrument(level = "trace", skip_all, fields(file_name = %document.file_name))]
pub async fn extract(
    machine: DocumentMachine<(), Discovered>,
    ctx: &PipelineContext<'_>,
    document: &SourceDocument,
) -> Result<(DocumentMachine<(), TextExtracted>, String), StageError> {
    let text = match ctx.services.extract_text(document).await {
        Ok(text) => text,
        Err(err) => {
            return Err(skip(
                machine.skip(),
                document,
                SkipReason::ExtractionFailed,
                err.to_string(),
            ))
        }
    };

    if text.trim().is_empty() {
        return Err(skip(
            machine.skip(),
            document,
            SkipReason::EmptyText,
            "no extractable text".to_string(),
        ));
    }

    debug!(
        file_name = %document.file_name,
        text_chars = text.chars().count(),
        "document text extracted"
    );

    let machine = machine
        .extract()
        .map_err(|(_, guard)| map_guard_error("extract", &guard))?;
    Ok((machine, text))
}

#[instrument(level = "trace", skip_all, fields(file_name = %document.file_name))]
pub async fn embed(
    machine: DocumentMachine<(), TextExtracted>,
    ctx: &PipelineContext<'_>,
    document: &SourceDocument,
    text: &str,
) -> Result<(DocumentMachine<(), Embedded>, Vec<f32>), StageError> {
    let vector = match ctx.services.embed(text).await {
        Ok(vector) if vector.is_empty() => {
            return Err(skip(
                machine.skip(),
                document,
                SkipReason::EmbeddingFailed,
                "embedder returned an empty vector".to_string(),
            ))
        }
        Ok(vector) => vector,
        Err(err) => {
            return Err(skip(
                machine.skip(),
                document,
                SkipReason::EmbeddingFailed,
                err.to_string(),
            ))
        }
    };

    if let Some(expected) = ctx.vector_size {
        if vector.len() as u64 != expected {
            return Err(skip(
                machine.skip(),
                document,
                SkipReason::DimensionMismatch,
                format!(
                    "collection expects {expected} dimensions, embedder produced {}",
                    vector.len()
                ),
            ));
        }
    }

    let machine = machine
        .embed()
        .map_err(|(_, guard)| map_guard_error("embed", &guard))?;
    Ok((machine, vector))
}

#[instrument(level = "trace", skip_all, fields(file_name = %document.file_name))]
pub async fn upsert(
    machine: DocumentMachine<(), Embedded>,
    ctx: &PipelineContext<'_>,
    document: &SourceDocument,
    vector: Vec<f32>,
) -> Result<Upserted, StageError> {
    let id = match derive_point_id(&document.file_name) {
        Ok(id) => id,
        Err(err) => {
            return Err(skip(
                machine.skip(),
                document,
                SkipReason::InvalidIdentifier,
                err.to_string(),
            ))
        }
    };

    let request = ctx.request;
    let payload = Payload::new(request.tenant_id.clone(), document.file_name.clone())
        .with_category(request.category.clone())
        .with_subcategory(request.subcategory.clone());
    let point = Point {
        id: id.clone(),
        vector,
        payload,
    };

    if let Err(err) = ctx.services.upsert_point(ctx.collection(), point).await {
        return Err(skip(
            machine.skip(),
            document,
            SkipReason::UpsertFailed,
            err.to_string(),
        ));
    }

    if ctx.existing.contains(&id) {
        let _machine = machine
            .replace()
            .map_err(|(_, guard)| map_guard_error("replace", &guard))?;
        Ok(Upserted::Updated(id))
    } else {
        let _machine = machine
            .insert()
            .map_err(|(_, guard)| map_guard_error("insert", &guard))?;
        Ok(Upserted::Inserted(id))
    }
}

fn skip<M>(
    transition: Result<DocumentMachine<(), Skipped>, (M, GuardError)>,
    document: &SourceDocument,
    reason: SkipReason,
    detail: String,
) -> StageError {
    match transition {
        Ok(_skipped) => StageError::Skipped(SkippedDocument {
            file: document.file_name.clone(),
            reason,
            detail,
        }),
        Err((_, guard)) => StageError::Fatal(map_guard_error("skip", &guard)),
    }
}

impl From<AppError> for StageError {
    fn from(err: AppError) -> Self {
        Self::Fatal(err)
    }
}

fn map_guard_error(event: &str, guard: &GuardError) -> AppError {
    AppError::InternalError(format!(
        "invalid document transition during {event}: {guard:?}"
    ))
}
