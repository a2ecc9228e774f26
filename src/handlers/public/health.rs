use axum::Json;
use serde_json::{json, Value};

/// GET /health - liveness check with a fixed body
pub async fn health_get() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
