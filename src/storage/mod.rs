//! Image ingest for projects and certificates.
//!
//! A `FileStore` persists one uploaded file and returns the URL the public
//! site should use for it. Size is checked before anything is written.

pub mod appwrite;
pub mod local;

pub use appwrite::AppwriteBucket;
pub use local::LocalFileStore;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::appwrite::{AppwriteClient, AppwriteError};
use crate::config::{AppConfig, StoreBackend};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File exceeds the {limit} byte upload limit")]
    TooLarge { limit: usize },

    #[error("Failed to write upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to upload file: {0}")]
    Upstream(#[from] AppwriteError),
}

/// One uploaded file as received from the form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persist the upload and return its public URL.
    async fn store(&self, upload: Upload) -> Result<String, StorageError>;
}

/// Keep ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
pub fn sanitize_file_name(name: &str) -> String {
    // Browsers may send a full client path
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if base.is_empty() {
        return "upload".to_string();
    }

    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn enforce_limit(upload: &Upload, limit: usize) -> Result<(), StorageError> {
    if upload.bytes.len() > limit {
        return Err(StorageError::TooLarge { limit });
    }
    Ok(())
}

/// File store matching the configured content backend.
pub async fn open_file_store(config: &AppConfig) -> Result<Arc<dyn FileStore>, StorageError> {
    let limit = config.server.max_upload_bytes;
    match config.store.backend {
        StoreBackend::Sqlite => {
            let store = LocalFileStore::open(&config.server.upload_dir, limit).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Appwrite => {
            let client = AppwriteClient::new(&config.appwrite)?;
            Ok(Arc::new(AppwriteBucket::new(client, config.appwrite.bucket_id.clone(), limit)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize_file_name("photo.png"), "photo.png");
        assert_eq!(sanitize_file_name("my photo (1).jpg"), "my_photo__1_.jpg");
        assert_eq!(sanitize_file_name("C:\\Users\\me\\cat.gif"), "cat.gif");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("résumé.pdf"), "r_sum_.pdf");
        assert_eq!(sanitize_file_name(""), "upload");
        assert_eq!(sanitize_file_name("dir/"), "upload");
    }

    #[test]
    fn rejects_oversized_uploads() {
        let upload = Upload {
            file_name: "big.bin".into(),
            content_type: None,
            bytes: vec![0; 11],
        };
        assert!(enforce_limit(&upload, 11).is_ok());
        assert!(matches!(
            enforce_limit(&upload, 10),
            Err(StorageError::TooLarge { limit: 10 })
        ));
    }
}
