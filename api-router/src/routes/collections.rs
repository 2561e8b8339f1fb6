use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use common::{
    error::AppError,
    storage::types::{
        collection::{Collection, CollectionResponse, CreateOutcome},
        collection_config::CollectionConfig,
        distance::DistanceMetric,
    },
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{api_state::ApiState, error::ApiError};

pub async fn list_collections(
    State(state): State<ApiState>,
) -> Result<Json<CollectionResponse>, ApiError> {
    match Collection::list(state.store.as_ref()).await {
        Ok(response) => Ok(Json(response)),
        Err(err) if err.is_unavailable() => {
            warn!(error = %err, "Vector store unavailable; returning empty collection list");
            Ok(Json(CollectionResponse::unavailable()))
        }
        Err(err) => Err(ApiError::InternalError(format!(
            "Error listing collections: {err}"
        ))),
    }
}

pub async fn get_collection(
    State(state): State<ApiState>,
    Path(collection_name): Path<String>,
) -> Result<Json<CollectionConfig>, ApiError> {
    let config = Collection::details(state.store.as_ref(), &collection_name).await?;
    Ok(Json(config))
}

#[derive(Debug, Deserialize)]
pub struct CreateCollectionParams {
    pub collection_name: String,
    pub vector_size: u64,
    pub distance: String,
}

#[derive(Debug, Serialize)]
pub struct CreateCollectionResponse {
    pub message: String,
}

pub async fn create_collection(
    State(state): State<ApiState>,
    params: Result<Query<CreateCollectionParams>, QueryRejection>,
) -> Result<Json<CreateCollectionResponse>, ApiError> {
    let Query(params) = params.map_err(|rejection| {
        ApiError::ValidationError(format!("Invalid query parameters: {}", rejection.body_text()))
    })?;
    let distance: DistanceMetric = params.distance.parse()?;

    let outcome = Collection::ensure_created(
        state.store.as_ref(),
        &params.collection_name,
        params.vector_size,
        distance,
    )
    .await
    .map_err(|err| match err {
        AppError::Validation(msg) => ApiError::ValidationError(msg),
        other => ApiError::InternalError(format!("Error creating collection: {other}")),
    })?;

    info!(
        collection = %params.collection_name,
        created = outcome == CreateOutcome::Created,
        "Create collection request handled"
    );

    Ok(Json(CreateCollectionResponse {
        message: format!(
            "Collection '{}' created successfully with distance metric '{distance}'.",
            params.collection_name
        ),
    }))
}
