use axum::extract::State;

use crate::database::models::{Certificate, Project};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/projects - all projects, newest first
pub async fn projects(State(state): State<AppState>) -> ApiResult<Vec<Project>> {
    let projects = state.store.list_projects().await?;
    Ok(ApiResponse::success(projects))
}

/// GET /api/certificates - all certificates, oldest first
pub async fn certificates(State(state): State<AppState>) -> ApiResult<Vec<Certificate>> {
    let certificates = state.store.list_certificates().await?;
    Ok(ApiResponse::success(certificates))
}
