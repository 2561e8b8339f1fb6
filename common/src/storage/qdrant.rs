//! REST client for the Qdrant service.
//!
//! Talks to the HTTP API (`http://{host}:{port}`) with `reqwest`; request and
//! response bodies are the store's documented JSON shapes. Every call is
//! bounded by the client-wide timeout.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client, Method, RequestBuilder, Response, StatusCode, Url,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::{error::AppError, utils::config::AppConfig};

use super::{
    types::{
        collection::CollectionResponse,
        collection_config::CollectionConfig,
        distance::DistanceMetric,
        payload::{TenantId, TENANT_KEY},
        point::{Point, PointId, ScrollPage},
    },
    vector_store::VectorStore,
};

const API_KEY_HEADER: &str = "api-key";

#[derive(Clone)]
pub struct QdrantClient {
    http: Client,
    base_url: Url,
}

/// Generic `{ result, status, time }` envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct ExistsResult {
    exists: bool,
}

#[derive(Debug, Deserialize)]
struct ScrollResult {
    points: Vec<ScrolledPoint>,
    #[serde(default)]
    next_page_offset: Option<PointId>,
}

#[derive(Debug, Deserialize)]
struct ScrolledPoint {
    id: PointId,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    status: ErrorStatus,
}

#[derive(Debug, Deserialize)]
struct ErrorStatus {
    error: String,
}

#[derive(Debug, Serialize)]
struct UpsertBody<'a> {
    points: &'a [Point],
}

impl QdrantClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url).map_err(|err| {
            AppError::Validation(format!("invalid vector store url '{base_url}': {err}"))
        })?;

        let mut headers = HeaderMap::new();
        if !api_key.is_empty() {
            let mut value = HeaderValue::from_str(api_key).map_err(|_| {
                AppError::Validation("vector store api key contains invalid characters".into())
            })?;
            value.set_sensitive(true);
            headers.insert(API_KEY_HEADER, value);
        }

        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| AppError::InternalError(format!("failed to build http client: {err}")))?;

        info!(url = %base_url, timeout_secs = timeout.as_secs(), "Vector store client initialized");

        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            &config.qdrant_url(),
            &config.qdrant_api_key,
            config.store_timeout(),
        )
    }

    fn url(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AppError::InternalError("vector store url cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, AppError> {
        Ok(self.http.request(method, self.url(segments)?))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AppError> {
        let response = request.send().await?;
        let response = check_status(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Turns a non-success response into `NotFound` or `Store`, keeping the
/// store's own error message.
async fn check_status(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.status.error)
        .unwrap_or_else(|_| {
            if body.is_empty() {
                status.to_string()
            } else {
                body
            }
        });

    if status == StatusCode::NOT_FOUND {
        return Err(AppError::NotFound(message));
    }
    Err(AppError::Store {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl VectorStore for QdrantClient {
    async fn list_collections(&self) -> Result<CollectionResponse, AppError> {
        let request = self.request(Method::GET, &["collections"])?;
        self.send(request).await
    }

    async fn collection_exists(&self, name: &str) -> Result<bool, AppError> {
        let request = self.request(Method::GET, &["collections", name, "exists"])?;
        let envelope: Envelope<ExistsResult> = self.send(request).await?;
        Ok(envelope.result.exists)
    }

    async fn create_collection(
        &self,
        name: &str,
        vector_size: u64,
        distance: DistanceMetric,
    ) -> Result<(), AppError> {
        let body = json!({
            "vectors": {
                "size": vector_size,
                "distance": distance.as_store_value(),
            }
        });
        let request = self
            .request(Method::PUT, &["collections", name])?
            .json(&body);
        let _: Envelope<bool> = self.send(request).await?;
        Ok(())
    }

    async fn collection_info(&self, name: &str) -> Result<CollectionConfig, AppError> {
        let request = self.request(Method::GET, &["collections", name])?;
        self.send(request).await
    }

    async fn scroll_tenant_points(
        &self,
        collection: &str,
        tenant: &TenantId,
        limit: u32,
        offset: Option<PointId>,
    ) -> Result<ScrollPage, AppError> {
        let mut body = json!({
            "filter": {
                "must": [
                    { "key": TENANT_KEY, "match": { "value": tenant.as_str() } }
                ]
            },
            "limit": limit,
            "with_payload": false,
            "with_vector": false,
        });
        if let (Some(offset), Some(fields)) = (offset, body.as_object_mut()) {
            fields.insert("offset".into(), serde_json::to_value(offset)?);
        }

        let request = self
            .request(Method::POST, &["collections", collection, "points", "scroll"])?
            .json(&body);
        let envelope: Envelope<ScrollResult> = self.send(request).await?;

        debug!(
            collection = %collection,
            tenant_id = %tenant,
            returned = envelope.result.points.len(),
            has_more = envelope.result.next_page_offset.is_some(),
            "Scrolled tenant points"
        );

        Ok(ScrollPage {
            ids: envelope.result.points.into_iter().map(|p| p.id).collect(),
            next_page_offset: envelope.result.next_page_offset,
        })
    }

    async fn upsert(&self, collection: &str, points: Vec<Point>) -> Result<(), AppError> {
        if points.is_empty() {
            return Ok(());
        }
        let request = self
            .request(Method::PUT, &["collections", collection, "points"])?
            .query(&[("wait", "true")])
            .json(&UpsertBody { points: &points });
        let _: Envelope<serde_json::Value> = self.send(request).await?;
        Ok(())
    }

    async fn health(&self) -> Result<(), AppError> {
        let response = self.request(Method::GET, &["healthz"])?.send().await?;
        check_status(response).await?;
        Ok(())
    }
}
