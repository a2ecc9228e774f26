use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::appwrite::{AppwriteClient, AppwriteError};
use crate::config::{AppConfig, StoreBackend};

use super::appwrite::AppwriteStore;
use super::sqlite::SqliteStore;
use super::store::ContentStore;

/// Errors from the content stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("{operation} is not supported by the {backend} store")]
    Unsupported {
        backend: StoreBackend,
        operation: &'static str,
    },

    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Appwrite's 404 only means "no such record" on by-id calls; those map it
/// to `NotFound` themselves. Anywhere else it is a misconfiguration.
impl From<AppwriteError> for StoreError {
    fn from(err: AppwriteError) -> Self {
        match err {
            AppwriteError::Api { status, message, .. } => StoreError::Upstream { status, message },
            AppwriteError::Http(e) => StoreError::Http(e),
        }
    }
}

/// Open the store selected by configuration. Called once at startup; the
/// returned handle is shared by every request and closed at shutdown.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn ContentStore>, StoreError> {
    match config.store.backend {
        StoreBackend::Sqlite => {
            let store = SqliteStore::open(&config.store.database_path, config.store.tag_format).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Appwrite => {
            let appwrite = &config.appwrite;
            if appwrite.project_id.is_empty() {
                return Err(StoreError::ConfigMissing("APPWRITE_PROJECT_ID"));
            }
            if appwrite.api_key.is_empty() {
                return Err(StoreError::ConfigMissing("APPWRITE_API_KEY"));
            }

            let client = AppwriteClient::new(appwrite)?;
            info!(
                backend = "appwrite",
                endpoint = %client.endpoint(),
                database = %appwrite.database_id,
                "Content store ready"
            );
            Ok(Arc::new(AppwriteStore::new(client, appwrite.clone(), config.store.tag_format)))
        }
    }
}

/// Create the bootstrap admin when the store keeps its own credentials.
pub async fn bootstrap_admin(store: &dyn ContentStore, config: &AppConfig) -> Result<(), StoreError> {
    let security = &config.security;
    if store.ensure_admin(&security.admin_username, &security.admin_password).await? {
        info!("Default admin account '{}' created", security.admin_username);
    }
    Ok(())
}
