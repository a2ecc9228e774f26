use std::sync::Arc;

use tempfile::TempDir;

use crate::config::AppConfig;
use crate::database::models::Admin;
use crate::database::{bootstrap_admin, ContentStore, SqliteStore};
use crate::state::AppState;
use crate::storage::{FileStore, LocalFileStore};

/// Throwaway SQLite store and upload directory for unit tests. Everything
/// lives in a temp dir removed when the context is dropped.
pub struct TestContext {
    pub config: AppConfig,
    pub store: Arc<dyn ContentStore>,
    pub files: Arc<dyn FileStore>,
    _dir: TempDir,
}

impl TestContext {
    /// Fresh store with the default admin bootstrapped.
    pub async fn new() -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;

        let mut config = AppConfig::from_lookup(|_| None);
        config.store.database_path = dir.path().join("portfolio.db");
        config.server.upload_dir = dir.path().join("uploads");
        config.server.public_dir = dir.path().join("public");

        let store: Arc<dyn ContentStore> =
            Arc::new(SqliteStore::open(&config.store.database_path, config.store.tag_format).await?);
        bootstrap_admin(store.as_ref(), &config).await?;

        let files: Arc<dyn FileStore> = Arc::new(
            LocalFileStore::open(&config.server.upload_dir, config.server.max_upload_bytes).await?,
        );

        Ok(Self {
            config,
            store,
            files,
            _dir: dir,
        })
    }

    /// The bootstrapped admin.
    pub async fn admin(&self) -> Admin {
        self.store
            .find_admin(&self.config.security.admin_username)
            .await
            .expect("admin lookup")
            .expect("bootstrapped admin")
    }

    pub fn state(&self) -> AppState {
        AppState::new(self.config.clone(), self.store.clone(), self.files.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn context_starts_with_admin_and_empty_content() {
        let ctx = TestContext::new().await.unwrap();
        assert_eq!(ctx.admin().await.username, "admin");
        assert!(ctx.store.list_projects().await.unwrap().is_empty());
        assert!(ctx.config.server.upload_dir.is_dir());
    }
}
