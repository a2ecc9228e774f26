use async_trait::async_trait;
use tracing::info;

use super::{enforce_limit, sanitize_file_name, FileStore, StorageError, Upload};
use crate::appwrite::AppwriteClient;

/// Uploads into an Appwrite storage bucket and hands back the file's view URL.
pub struct AppwriteBucket {
    client: AppwriteClient,
    bucket_id: String,
    max_bytes: usize,
}

impl AppwriteBucket {
    pub fn new(client: AppwriteClient, bucket_id: String, max_bytes: usize) -> Self {
        Self {
            client,
            bucket_id,
            max_bytes,
        }
    }
}

#[async_trait]
impl FileStore for AppwriteBucket {
    async fn store(&self, upload: Upload) -> Result<String, StorageError> {
        enforce_limit(&upload, self.max_bytes)?;

        let size = upload.bytes.len();
        let file_id = self
            .client
            .create_file(
                &self.bucket_id,
                &sanitize_file_name(&upload.file_name),
                upload.content_type.as_deref(),
                upload.bytes,
            )
            .await?;

        info!("Uploaded {} bytes to bucket {} as {}", size, self.bucket_id, file_id);
        Ok(self.client.file_view_url(&self.bucket_id, &file_id))
    }
}
