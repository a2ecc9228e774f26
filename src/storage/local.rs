use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use super::{enforce_limit, sanitize_file_name, FileStore, StorageError, Upload};

/// Writes uploads into a directory served at `/uploads`.
pub struct LocalFileStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl LocalFileStore {
    /// Create the upload directory if needed.
    pub async fn open(dir: &Path, max_bytes: usize) -> Result<Self, StorageError> {
        tokio::fs::create_dir_all(dir).await?;
        Ok(Self {
            dir: dir.to_path_buf(),
            max_bytes,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(&self, upload: Upload) -> Result<String, StorageError> {
        enforce_limit(&upload, self.max_bytes)?;

        let name = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_file_name(&upload.file_name)
        );
        tokio::fs::write(self.dir.join(&name), &upload.bytes).await?;

        info!("Stored upload {} ({} bytes)", name, upload.bytes.len());
        Ok(format!("/uploads/{}", name))
    }
}
