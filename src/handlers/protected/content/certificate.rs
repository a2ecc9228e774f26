use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::database::models::{Certificate, NewCertificate};
use crate::error::ApiError;
use crate::handlers::ContentForm;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::store_image;

/// POST /api/certificates - create a certificate
///
/// `status` must be one of `In Progress`, `Upcoming`, `Planned`, `Completed`
/// (default `Completed`); `progress_percent` is 0-100 (default 100).
pub async fn post(State(state): State<AppState>, form: ContentForm) -> ApiResult<Certificate> {
    let input = NewCertificate::from_fields(&form.fields)?;
    let image_url = store_image(&state, form.image).await?;

    let certificate = state
        .store
        .create_certificate(input.with_image_url(image_url))
        .await?;
    Ok(ApiResponse::created(certificate))
}

/// DELETE /api/certificates/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete_certificate(&id).await?;
    Ok(Json(json!({ "message": "Certificate deleted" })))
}
