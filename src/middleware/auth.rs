use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated admin resolved by the session guard
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
}

/// Session middleware for admin-only routes: resolves the session cookie and
/// injects the admin into the request extensions.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = state.guard.authenticate(request.headers()).await?;

    tracing::debug!("Admin request by '{}'", auth_user.username);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}
