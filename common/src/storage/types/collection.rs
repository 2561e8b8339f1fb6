use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{error::AppError, storage::vector_store::VectorStore};

use super::{collection_config::CollectionConfig, distance::DistanceMetric};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionList {
    pub collections: Vec<Collection>,
}

/// The store's own envelope for `GET /collections`, passed through as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionResponse {
    pub time: f64,
    pub status: String,
    pub result: CollectionList,
}

impl CollectionResponse {
    /// Envelope served when the store cannot be reached.
    pub fn unavailable() -> Self {
        Self {
            time: 0.0,
            status: "unavailable".to_string(),
            result: CollectionList {
                collections: Vec::new(),
            },
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.result.collections.iter().map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyExisted,
}

impl Collection {
    pub async fn list(store: &dyn VectorStore) -> Result<CollectionResponse, AppError> {
        let response = store.list_collections().await?;
        info!(
            count = response.result.collections.len(),
            "Retrieved collections"
        );
        Ok(response)
    }

    pub async fn details(store: &dyn VectorStore, name: &str) -> Result<CollectionConfig, AppError> {
        validate_name(name)?;
        let config = store.collection_info(name).await?;
        info!(collection = %name, "Retrieved collection details");
        Ok(config)
    }

    /// Creates the collection unless it already exists.
    ///
    /// Existence check and creation are two separate store calls, so a
    /// concurrent creator can win in between; a failed create followed by a
    /// positive existence check counts as `AlreadyExisted`.
    pub async fn ensure_created(
        store: &dyn VectorStore,
        name: &str,
        vector_size: u64,
        distance: DistanceMetric,
    ) -> Result<CreateOutcome, AppError> {
        validate_name(name)?;
        if vector_size == 0 {
            return Err(AppError::Validation(
                "vector_size must be greater than zero".into(),
            ));
        }

        if store.collection_exists(name).await? {
            info!(collection = %name, "Collection already exists");
            return Ok(CreateOutcome::AlreadyExisted);
        }

        match store.create_collection(name, vector_size, distance).await {
            Ok(()) => {
                info!(
                    collection = %name,
                    vector_size,
                    distance = distance.as_store_value(),
                    "Collection created"
                );
                Ok(CreateOutcome::Created)
            }
            Err(err) => {
                if !err.is_unavailable() && store.collection_exists(name).await.unwrap_or(false) {
                    warn!(
                        collection = %name,
                        error = %err,
                        "Collection was created concurrently; treating as existing"
                    );
                    return Ok(CreateOutcome::AlreadyExisted);
                }
                Err(err)
            }
        }
    }
}

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation(
            "collection_name must not be empty".into(),
        ));
    }
    if name.contains('/') {
        return Err(AppError::Validation(format!(
            "collection_name '{name}' must not contain '/'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::InMemoryVectorStore;

    #[tokio::test]
    async fn test_ensure_created_is_idempotent() {
        let store = InMemoryVectorStore::new();

        let first = Collection::ensure_created(&store, "test", 384, DistanceMetric::Cosine)
            .await
            .expect("first create");
        let second = Collection::ensure_created(&store, "test", 384, DistanceMetric::Cosine)
            .await
            .expect("second create");

        assert_eq!(first, CreateOutcome::Created);
        assert_eq!(second, CreateOutcome::AlreadyExisted);
        assert_eq!(store.create_calls().await, 1);
    }

    #[tokio::test]
    async fn test_ensure_created_validates_before_store_calls() {
        let store = InMemoryVectorStore::new();
        store.set_unavailable(true).await;

        let err = Collection::ensure_created(&store, "test", 0, DistanceMetric::Cosine)
            .await
            .expect_err("zero size rejected");
        assert!(matches!(err, AppError::Validation(_)));

        let err = Collection::ensure_created(&store, " ", 8, DistanceMetric::Cosine)
            .await
            .expect_err("blank name rejected");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_ensure_created_tolerates_concurrent_creator() {
        let store = InMemoryVectorStore::new();
        store.create_concurrently_on_next_create().await;

        let outcome = Collection::ensure_created(&store, "race", 16, DistanceMetric::DotProduct)
            .await
            .expect("race tolerated");
        assert_eq!(outcome, CreateOutcome::AlreadyExisted);
    }

    #[tokio::test]
    async fn test_ensure_created_surfaces_unavailable_store() {
        let store = InMemoryVectorStore::new();
        store.set_unavailable(true).await;

        let err = Collection::ensure_created(&store, "test", 8, DistanceMetric::Cosine)
            .await
            .expect_err("store down");
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_list_keeps_store_order() {
        let store = InMemoryVectorStore::new();
        for name in ["docs", "images"] {
            Collection::ensure_created(&store, name, 4, DistanceMetric::Cosine)
                .await
                .expect("create");
        }

        let response = Collection::list(&store).await.expect("list");
        assert_eq!(response.status, "ok");
        assert_eq!(response.names().collect::<Vec<_>>(), vec!["docs", "images"]);
    }
}
