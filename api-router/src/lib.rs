use api_state::ApiState;
use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use routes::{
    collections::{create_collection, get_collection, list_collections},
    liveness::live,
    readiness::ready,
};
use tower_http::trace::TraceLayer;

pub mod api_state;
pub mod error;
mod routes;

/// Collection administration endpoints plus the probes.
pub fn api_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    // Public, unauthenticated endpoints (for k8s/systemd probes)
    let probes = Router::new()
        .route("/ready", get(ready))
        .route("/live", get(live));

    let collections = Router::new()
        .route("/collections", get(list_collections))
        .route("/collections/{collection_name}", get(get_collection))
        .route("/create-collection", post(create_collection))
        .route("/create-collection/", post(create_collection));

    probes
        .merge(collections)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
        Router,
    };
    use common::storage::{memory::InMemoryVectorStore, vector_store::VectorStore};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;

    fn app(store: Arc<InMemoryVectorStore>) -> Router {
        let store: Arc<dyn VectorStore> = store;
        api_routes().with_state(ApiState::with_store(store))
    }

    async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_list_collections_in_store_order() {
        let store = Arc::new(InMemoryVectorStore::with_collection("docs", 384).await);
        store
            .create_collection(
                "images",
                512,
                common::storage::types::distance::DistanceMetric::DotProduct,
            )
            .await
            .expect("seed");

        let (status, body) = send(app(store), Method::GET, "/collections").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(
            body["result"]["collections"],
            json!([{ "name": "docs" }, { "name": "images" }])
        );
    }

    #[tokio::test]
    async fn test_list_collections_degrades_when_store_is_down() {
        let store = Arc::new(InMemoryVectorStore::new());
        store.set_unavailable(true).await;

        let (status, body) = send(app(store), Method::GET, "/collections").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "time": 0.0, "status": "unavailable", "result": { "collections": [] } })
        );
    }

    #[tokio::test]
    async fn test_create_collection_reports_metric() {
        let store = Arc::new(InMemoryVectorStore::new());

        let (status, body) = send(
            app(Arc::clone(&store)),
            Method::POST,
            "/create-collection/?collection_name=test&vector_size=384&distance=COSINE",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "message": "Collection 'test' created successfully with distance metric 'DistanceMetric.COSINE'."
            })
        );
        assert!(store.collection_exists("test").await.expect("exists"));
    }

    #[tokio::test]
    async fn test_create_collection_twice_succeeds() {
        let store = Arc::new(InMemoryVectorStore::new());
        let uri = "/create-collection?collection_name=test&vector_size=8&distance=dot";

        let (first, _) = send(app(Arc::clone(&store)), Method::POST, uri).await;
        let (second, body) = send(app(Arc::clone(&store)), Method::POST, uri).await;

        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::OK);
        assert!(body["message"]
            .as_str()
            .is_some_and(|m| m.ends_with("'DistanceMetric.DOT_PRODUCT'.")));
        assert_eq!(store.create_calls().await, 1);
    }

    #[tokio::test]
    async fn test_create_collection_rejects_bad_parameters() {
        let store = Arc::new(InMemoryVectorStore::new());

        for uri in [
            "/create-collection/?collection_name=test&vector_size=384&distance=MANHATTAN",
            "/create-collection/?collection_name=test&vector_size=0&distance=COSINE",
            "/create-collection/?collection_name=test&vector_size=-4&distance=COSINE",
            "/create-collection/?collection_name=test&distance=COSINE",
        ] {
            let (status, body) = send(app(Arc::clone(&store)), Method::POST, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {uri}");
            assert!(body["detail"].is_string(), "uri: {uri}");
        }
        assert_eq!(store.create_calls().await, 0);
    }

    #[tokio::test]
    async fn test_create_collection_store_failure_is_500() {
        let store = Arc::new(InMemoryVectorStore::new());
        store.set_unavailable(true).await;

        let (status, body) = send(
            app(store),
            Method::POST,
            "/create-collection/?collection_name=test&vector_size=384&distance=COSINE",
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"]
            .as_str()
            .is_some_and(|d| d.starts_with("Error creating collection:")));
    }

    #[tokio::test]
    async fn test_collection_details() {
        let store = Arc::new(InMemoryVectorStore::with_collection("docs", 384).await);

        let (status, body) = send(app(Arc::clone(&store)), Method::GET, "/collections/docs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["config"]["params"]["vectors"]["size"], 384);

        let (status, body) = send(app(store), Method::GET, "/collections/ghost").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_probes() {
        let store = Arc::new(InMemoryVectorStore::new());

        let (status, body) = send(app(Arc::clone(&store)), Method::GET, "/live").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));

        let (status, _) = send(app(Arc::clone(&store)), Method::GET, "/ready").await;
        assert_eq!(status, StatusCode::OK);

        store.set_unavailable(true).await;
        let (status, body) = send(app(store), Method::GET, "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["checks"]["vector_store"], "fail");
    }
}
