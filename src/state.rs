use std::sync::Arc;

use crate::auth::SessionGuard;
use crate::config::AppConfig;
use crate::database::ContentStore;
use crate::storage::FileStore;

/// Service handles shared by every request. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ContentStore>,
    pub files: Arc<dyn FileStore>,
    pub guard: SessionGuard,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn ContentStore>, files: Arc<dyn FileStore>) -> Self {
        let guard = SessionGuard::new(&config.security, store.clone());
        Self {
            config: Arc::new(config),
            store,
            files,
            guard,
        }
    }
}
