use async_trait::async_trait;

use crate::error::AppError;

use super::types::{
    collection::CollectionResponse,
    collection_config::CollectionConfig,
    distance::DistanceMetric,
    payload::TenantId,
    point::{Point, PointId, ScrollPage},
};

/// Operations this system needs from the vector database.
///
/// Implementations are shared across requests behind an `Arc` and must be
/// safe for concurrent use.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn list_collections(&self) -> Result<CollectionResponse, AppError>;

    async fn collection_exists(&self, name: &str) -> Result<bool, AppError>;

    async fn create_collection(
        &self,
        name: &str,
        vector_size: u64,
        distance: DistanceMetric,
    ) -> Result<(), AppError>;

    async fn collection_info(&self, name: &str) -> Result<CollectionConfig, AppError>;

    /// Lists one page of point ids whose payload `tenant_id` equals `tenant`.
    async fn scroll_tenant_points(
        &self,
        collection: &str,
        tenant: &TenantId,
        limit: u32,
        offset: Option<PointId>,
    ) -> Result<ScrollPage, AppError>;

    async fn upsert(&self, collection: &str, points: Vec<Point>) -> Result<(), AppError>;

    async fn health(&self) -> Result<(), AppError>;
}
