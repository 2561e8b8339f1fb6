use axum::Json;
use serde_json::{json, Value};

/// Answers as long as the process can serve requests; never touches the store.
pub async fn live() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
