//! In-process `VectorStore` used by tests across the workspace.
//!
//! Mirrors the store behaviour the rest of the system relies on: collections
//! keep creation order, scrolls are tenant-filtered and paginated by id, and
//! upserts replace points with the same id. An outage switch turns every call
//! into `StoreUnavailable`.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::AppError;

use super::{
    types::{
        collection::{Collection, CollectionList, CollectionResponse},
        collection_config::{
            CollectionConfig, CollectionInfo, CollectionParams, ConfigSnapshot, HnswConfig,
            OptimizerConfig, VectorParams, VectorsConfig, WalConfig,
        },
        distance::DistanceMetric,
        payload::{Payload, TenantId},
        point::{Point, PointId, ScrollPage},
    },
    vector_store::VectorStore,
};

#[derive(Debug, Clone)]
pub struct StoredPoint {
    pub vector: Vec<f32>,
    pub payload: Payload,
}

#[derive(Debug)]
struct MemoryCollection {
    name: String,
    vector_size: u64,
    distance: DistanceMetric,
    points: BTreeMap<PointId, StoredPoint>,
}

#[derive(Debug, Default)]
struct MemoryState {
    collections: Vec<MemoryCollection>,
    unavailable: bool,
    race_next_create: bool,
    create_calls: usize,
    upsert_calls: usize,
    scroll_calls: usize,
    failing_sources: Vec<String>,
}

impl MemoryState {
    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable {
            return Err(AppError::StoreUnavailable(
                "in-memory store switched off".into(),
            ));
        }
        Ok(())
    }

    fn collection(&self, name: &str) -> Result<&MemoryCollection, AppError> {
        self.collections
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| AppError::NotFound(format!("Collection `{name}` doesn't exist!")))
    }

    fn collection_mut(&mut self, name: &str) -> Result<&mut MemoryCollection, AppError> {
        self.collections
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| AppError::NotFound(format!("Collection `{name}` doesn't exist!")))
    }

    fn insert_collection(&mut self, name: &str, vector_size: u64, distance: DistanceMetric) {
        self.collections.push(MemoryCollection {
            name: name.to_string(),
            vector_size,
            distance,
            points: BTreeMap::new(),
        });
    }
}

#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    state: Mutex<MemoryState>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_collection(name: &str, vector_size: u64) -> Self {
        let store = Self::new();
        store
            .state
            .lock()
            .await
            .insert_collection(name, vector_size, DistanceMetric::Cosine);
        store
    }

    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().await.unavailable = unavailable;
    }

    /// The next `create_collection` behaves as if another caller created the
    /// collection first: the collection appears and the call fails.
    pub async fn create_concurrently_on_next_create(&self) {
        self.state.lock().await.race_next_create = true;
    }

    /// Upserts of points whose payload `source` equals `source` fail.
    pub async fn fail_upserts_for_source(&self, source: &str) {
        self.state.lock().await.failing_sources.push(source.to_string());
    }

    pub async fn create_calls(&self) -> usize {
        self.state.lock().await.create_calls
    }

    pub async fn upsert_calls(&self) -> usize {
        self.state.lock().await.upsert_calls
    }

    pub async fn scroll_calls(&self) -> usize {
        self.state.lock().await.scroll_calls
    }

    pub async fn points(&self, collection: &str) -> BTreeMap<PointId, StoredPoint> {
        let state = self.state.lock().await;
        state
            .collection(collection)
            .map(|c| c.points.clone())
            .unwrap_or_default()
    }

    /// Writes a point directly, bypassing request counting.
    pub async fn seed_point(&self, collection: &str, point: Point) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        let target = state.collection_mut(collection)?;
        target.points.insert(
            point.id,
            StoredPoint {
                vector: point.vector,
                payload: point.payload,
            },
        );
        Ok(())
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn list_collections(&self) -> Result<CollectionResponse, AppError> {
        let state = self.state.lock().await;
        state.check_available()?;
        Ok(CollectionResponse {
            time: 0.0001,
            status: "ok".to_string(),
            result: CollectionList {
                collections: state
                    .collections
                    .iter()
                    .map(|c| Collection {
                        name: c.name.clone(),
                    })
                    .collect(),
            },
        })
    }

    async fn collection_exists(&self, name: &str) -> Result<bool, AppError> {
        let state = self.state.lock().await;
        state.check_available()?;
        Ok(state.collection(name).is_ok())
    }

    async fn create_collection(
        &self,
        name: &str,
        vector_size: u64,
        distance: DistanceMetric,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        state.check_available()?;
        state.create_calls = state.create_calls.saturating_add(1);

        if state.race_next_create {
            state.race_next_create = false;
            state.insert_collection(name, vector_size, distance);
            return Err(AppError::Store {
                status: 409,
                message: format!("Collection `{name}` already exists!"),
            });
        }
        if state.collection(name).is_ok() {
            return Err(AppError::Store {
                status: 409,
                message: format!("Collection `{name}` already exists!"),
            });
        }
        state.insert_collection(name, vector_size, distance);
        Ok(())
    }

    async fn collection_info(&self, name: &str) -> Result<CollectionConfig, AppError> {
        let state = self.state.lock().await;
        state.check_available()?;
        let collection = state.collection(name)?;
        let points = collection.points.len() as u64;

        Ok(CollectionConfig {
            time: 0.0001,
            status: "ok".to_string(),
            result: CollectionInfo {
                status: "green".to_string(),
                optimizer_status: serde_json::Value::String("ok".into()),
                segments_count: 1,
                config: ConfigSnapshot {
                    params: CollectionParams {
                        vectors: Some(VectorsConfig::Single(VectorParams {
                            size: collection.vector_size,
                            distance: collection.distance.as_store_value().to_string(),
                        })),
                        extra: HashMap::new(),
                    },
                    hnsw_config: HnswConfig {
                        m: 16,
                        ef_construct: 100,
                        full_scan_threshold: 10_000,
                        extra: HashMap::new(),
                    },
                    optimizer_config: OptimizerConfig {
                        deleted_threshold: 0.2,
                        vacuum_min_vector_number: 1_000,
                        default_segment_number: 0,
                        flush_interval_sec: 5,
                        extra: HashMap::new(),
                    },
                    wal_config: WalConfig {
                        wal_capacity_mb: 32,
                        wal_segments_ahead: 0,
                    },
                    quantization_config: None,
                },
                payload_schema: HashMap::new(),
                vectors_count: Some(points),
                indexed_vectors_count: Some(0),
                points_count: Some(points),
            },
        })
    }

    async fn scroll_tenant_points(
        &self,
        collection: &str,
        tenant: &TenantId,
        limit: u32,
        offset: Option<PointId>,
    ) -> Result<ScrollPage, AppError> {
        let mut state = self.state.lock().await;
        state.check_available()?;
        state.scroll_calls = state.scroll_calls.saturating_add(1);
        let collection = state.collection(collection)?;

        let mut matching = collection
            .points
            .iter()
            .filter(|(_, point)| point.payload.tenant_id == *tenant)
            .map(|(id, _)| id)
            .filter(|id| offset.as_ref().map_or(true, |start| *id >= start));

        let limit = usize::try_from(limit).unwrap_or(usize::MAX).max(1);
        let ids: Vec<PointId> = matching.by_ref().take(limit).cloned().collect();
        let next_page_offset = matching.next().cloned();

        Ok(ScrollPage {
            ids,
            next_page_offset,
        })
    }

    async fn upsert(&self, collection: &str, points: Vec<Point>) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        state.check_available()?;
        state.upsert_calls = state.upsert_calls.saturating_add(1);

        if let Some(source) = points
            .iter()
            .map(|p| &p.payload.source)
            .find(|source| state.failing_sources.contains(*source))
        {
            return Err(AppError::Store {
                status: 500,
                message: format!("simulated upsert failure for {source}"),
            });
        }

        let target = state.collection_mut(collection)?;
        for point in points {
            if point.vector.len() as u64 != target.vector_size {
                return Err(AppError::Store {
                    status: 400,
                    message: format!(
                        "Wrong input: Vector dimension error: expected dim: {}, got {}",
                        target.vector_size,
                        point.vector.len()
                    ),
                });
            }
            target.points.insert(
                point.id,
                StoredPoint {
                    vector: point.vector,
                    payload: point.payload,
                },
            );
        }
        Ok(())
    }

    async fn health(&self) -> Result<(), AppError> {
        self.state.lock().await.check_available()
    }
}
