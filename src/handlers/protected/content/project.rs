use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::database::models::{Fields, NewProject, Project};
use crate::error::ApiError;
use crate::handlers::ContentForm;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::store_image;

/// Field naming the image to keep when a project is updated without a new upload.
const EXISTING_IMAGE_FIELD: &str = "existing_image";

/// POST /api/projects - create a project, optionally with an `image` upload
///
/// Fields are validated before the image is stored, so a rejected form
/// writes nothing.
pub async fn post(State(state): State<AppState>, form: ContentForm) -> ApiResult<Project> {
    let input = NewProject::from_fields(&form.fields, state.config.store.tag_format)?;
    let image_url = store_image(&state, form.image).await?;

    let project = state.store.create_project(input.with_image_url(image_url)).await?;
    Ok(ApiResponse::created(project))
}

/// PUT /api/projects/:id - replace a project
///
/// A new `image` upload wins; otherwise `existing_image` is kept as the
/// image URL, and an absent `existing_image` clears it.
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: ContentForm,
) -> ApiResult<Project> {
    let input = NewProject::from_fields(&form.fields, state.config.store.tag_format)?;
    let kept_image = existing_image(&form.fields);
    let image_url = store_image(&state, form.image).await?.or(kept_image);

    let project = state.store.update_project(&id, input.with_image_url(image_url)).await?;
    Ok(ApiResponse::success(project))
}

/// DELETE /api/projects/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete_project(&id).await?;
    Ok(Json(json!({ "message": "Project deleted" })))
}

fn existing_image(fields: &Fields) -> Option<String> {
    fields
        .get(EXISTING_IMAGE_FIELD)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty() && *v != "null")
        .map(str::to_string)
}
