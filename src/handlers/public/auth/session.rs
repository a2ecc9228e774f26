use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::SessionCookies;
use crate::error::ApiError;
use crate::handlers::form::body_rejection;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/login - Check admin credentials and start a session
///
/// Expected Input:
/// ```json
/// { "username": "admin", "password": "admin123" }
/// ```
///
/// On success the session cookie is set (`token` or `admin_session`,
/// depending on the session mode) and the body is
/// `{"success": true, "message": "Login successful"}`.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(SessionCookies, Json<Value>), ApiError> {
    let Json(request) =
        payload.map_err(|e| body_rejection(e.status(), e.body_text(), ApiError::bad_request))?;

    let username = request.username.trim();
    if username.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let admin = state
        .store
        .authenticate(username, &request.password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let cookies = state.guard.issue(&admin)?;
    info!("Admin '{}' logged in", admin.username);

    Ok((
        cookies,
        Json(json!({ "success": true, "message": "Login successful" })),
    ))
}

/// POST /api/logout - Clear the session cookie
pub async fn logout(State(state): State<AppState>) -> (SessionCookies, Json<Value>) {
    (state.guard.clear(), Json(json!({ "message": "Logged out" })))
}
