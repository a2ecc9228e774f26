pub mod certificate;
pub mod project;

// Re-export handler functions for use in routing
pub use project::delete as project_delete;
pub use project::post as project_post;
pub use project::put as project_put;

pub use certificate::delete as certificate_delete;
pub use certificate::post as certificate_post;

use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::Upload;

/// Store the submitted image, if any, and return its URL.
async fn store_image(state: &AppState, image: Option<Upload>) -> Result<Option<String>, ApiError> {
    match image {
        Some(upload) => Ok(Some(state.files.store(upload).await?)),
        None => Ok(None),
    }
}
