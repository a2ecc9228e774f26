use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::middleware::AuthUser;

/// GET /api/check-auth - report the admin behind the current session
///
/// ```json
/// { "authenticated": true, "user": { "id": "1", "username": "admin" } }
/// ```
pub async fn check(Extension(user): Extension<AuthUser>) -> Json<Value> {
    Json(json!({ "authenticated": true, "user": user }))
}
