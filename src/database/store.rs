use async_trait::async_trait;

use crate::config::StoreBackend;

use super::manager::StoreError;
use super::models::{Admin, Certificate, NewCertificate, NewProject, Project};

/// Backend-agnostic content store.
///
/// Handlers and the CLI only ever see this trait. Ids arrive as the raw path
/// segment; each backend decides what a valid id looks like and reports
/// anything it cannot find as `StoreError::NotFound`.
#[async_trait]
pub trait ContentStore: Send + Sync {
    fn backend(&self) -> StoreBackend;

    /// All projects, newest first.
    async fn list_projects(&self) -> Result<Vec<Project>, StoreError>;

    async fn create_project(&self, input: NewProject) -> Result<Project, StoreError>;

    /// Replace every field of an existing project.
    async fn update_project(&self, id: &str, input: NewProject) -> Result<Project, StoreError>;

    async fn delete_project(&self, id: &str) -> Result<(), StoreError>;

    /// All certificates, oldest first.
    async fn list_certificates(&self) -> Result<Vec<Certificate>, StoreError>;

    async fn create_certificate(&self, input: NewCertificate) -> Result<Certificate, StoreError>;

    async fn delete_certificate(&self, id: &str) -> Result<(), StoreError>;

    /// Admin allow-list lookup.
    async fn find_admin(&self, username: &str) -> Result<Option<Admin>, StoreError>;

    /// Check credentials. `Ok(None)` means they were rejected.
    async fn authenticate(&self, username: &str, password: &str) -> Result<Option<Admin>, StoreError>;

    /// Create the admin if missing. Returns whether a record was created.
    async fn ensure_admin(&self, username: &str, password: &str) -> Result<bool, StoreError>;

    async fn set_admin_password(&self, username: &str, password: &str) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;

    async fn close(&self);
}
