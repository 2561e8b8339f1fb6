//! Read-only snapshot of a collection's configuration, as reported by the
//! store. Nothing here is written back; fields the store may omit are
//! optional.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub time: f64,
    pub status: String,
    pub result: CollectionInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub status: String,
    /// Either `"ok"` or `{ "error": "..." }`.
    pub optimizer_status: serde_json::Value,
    #[serde(default)]
    pub segments_count: u64,
    pub config: ConfigSnapshot,
    #[serde(default)]
    pub payload_schema: HashMap<String, PayloadSchemaInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vectors_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed_vectors_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_count: Option<u64>,
}

impl CollectionInfo {
    /// Size of the collection's unnamed vector, if it has exactly one.
    pub fn vector_size(&self) -> Option<u64> {
        match self.config.params.vectors.as_ref()? {
            VectorsConfig::Single(params) => Some(params.size),
            VectorsConfig::Named(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub params: CollectionParams,
    pub hnsw_config: HnswConfig,
    pub optimizer_config: OptimizerConfig,
    pub wal_config: WalConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantization_config: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vectors: Option<VectorsConfig>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VectorsConfig {
    Single(VectorParams),
    Named(HashMap<String, VectorParams>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorParams {
    pub size: u64,
    pub distance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HnswConfig {
    pub m: u64,
    pub ef_construct: u64,
    pub full_scan_threshold: u64,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub deleted_threshold: f64,
    pub vacuum_min_vector_number: u64,
    pub default_segment_number: u64,
    pub flush_interval_sec: u64,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalConfig {
    pub wal_capacity_mb: u64,
    pub wal_segments_ahead: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadSchemaInfo {
    pub data_type: String,
    #[serde(default)]
    pub points: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "time": 0.000123,
        "status": "ok",
        "result": {
            "status": "green",
            "optimizer_status": "ok",
            "segments_count": 8,
            "config": {
                "params": {
                    "vectors": { "size": 384, "distance": "Cosine" },
                    "shard_number": 1,
                    "replication_factor": 1,
                    "on_disk_payload": true
                },
                "hnsw_config": {
                    "m": 16,
                    "ef_construct": 100,
                    "full_scan_threshold": 10000,
                    "max_indexing_threads": 0,
                    "on_disk": false
                },
                "optimizer_config": {
                    "deleted_threshold": 0.2,
                    "vacuum_min_vector_number": 1000,
                    "default_segment_number": 0,
                    "max_segment_size": null,
                    "flush_interval_sec": 5
                },
                "wal_config": { "wal_capacity_mb": 32, "wal_segments_ahead": 0 },
                "quantization_config": null
            },
            "payload_schema": {
                "tenant_id": { "data_type": "keyword", "points": 42 }
            },
            "indexed_vectors_count": 0,
            "points_count": 42
        }
    }"#;

    #[test]
    fn test_deserializes_store_snapshot() {
        let config: CollectionConfig = serde_json::from_str(SAMPLE).expect("parse snapshot");

        assert_eq!(config.status, "ok");
        assert_eq!(config.result.segments_count, 8);
        assert_eq!(config.result.config.hnsw_config.m, 16);
        assert_eq!(config.result.config.wal_config.wal_capacity_mb, 32);
        assert_eq!(config.result.points_count, Some(42));
        assert_eq!(config.result.vectors_count, None);
        assert_eq!(
            config
                .result
                .payload_schema
                .get("tenant_id")
                .map(|s| s.data_type.as_str()),
            Some("keyword")
        );
        assert_eq!(config.result.vector_size(), Some(384));
    }

    #[test]
    fn test_named_vectors_have_no_single_size() {
        let params: CollectionParams = serde_json::from_str(
            r#"{ "vectors": { "text": { "size": 384, "distance": "Dot" } } }"#,
        )
        .expect("parse params");
        assert!(matches!(params.vectors, Some(VectorsConfig::Named(_))));
    }
}
