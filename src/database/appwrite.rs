//! Content store backed by Appwrite databases.
//!
//! Documents use the same attribute names as the SQLite columns. Admins are
//! identified by the `email` attribute; their passwords live in Appwrite
//! accounts, not in the collection.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::appwrite::{query, AppwriteClient, AppwriteError};
use crate::config::{AppwriteConfig, StoreBackend};

use super::manager::StoreError;
use super::models::{
    parse_timestamp, Admin, Certificate, CertificateStatus, NewCertificate, NewProject, Project,
};
use super::models::certificate::DEFAULT_PROGRESS;
use super::store::ContentStore;
use super::tags::TagFormat;

pub struct AppwriteStore {
    client: AppwriteClient,
    config: AppwriteConfig,
    tags: TagFormat,
}

impl AppwriteStore {
    pub fn new(client: AppwriteClient, config: AppwriteConfig, tags: TagFormat) -> Self {
        Self { client, config, tags }
    }

    fn database(&self) -> &str {
        &self.config.database_id
    }
}

#[async_trait]
impl ContentStore for AppwriteStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Appwrite
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let queries = [query::order_desc("$createdAt"), query::limit(query::PAGE_LIMIT)];
        let documents = self
            .client
            .list_documents(self.database(), &self.config.projects_collection_id, &queries)
            .await?;

        documents
            .iter()
            .map(|doc| project_from_document(doc, self.tags))
            .collect()
    }

    async fn create_project(&self, input: NewProject) -> Result<Project, StoreError> {
        let document = self
            .client
            .create_document(
                self.database(),
                &self.config.projects_collection_id,
                project_document(&input, self.tags),
            )
            .await?;

        let project = project_from_document(&document, self.tags)?;
        info!("Created project {} '{}'", project.id, project.title);
        Ok(project)
    }

    async fn update_project(&self, id: &str, input: NewProject) -> Result<Project, StoreError> {
        let document = self
            .client
            .update_document(
                self.database(),
                &self.config.projects_collection_id,
                id,
                project_document(&input, self.tags),
            )
            .await
            .map_err(|e| missing_record(e, "Project", id))?;

        info!("Updated project {}", id);
        project_from_document(&document, self.tags)
    }

    async fn delete_project(&self, id: &str) -> Result<(), StoreError> {
        self.client
            .delete_document(self.database(), &self.config.projects_collection_id, id)
            .await
            .map_err(|e| missing_record(e, "Project", id))?;
        info!("Deleted project {}", id);
        Ok(())
    }

    async fn list_certificates(&self) -> Result<Vec<Certificate>, StoreError> {
        let queries = [query::order_asc("$createdAt"), query::limit(query::PAGE_LIMIT)];
        let documents = self
            .client
            .list_documents(self.database(), &self.config.certificates_collection_id, &queries)
            .await?;

        documents.iter().map(certificate_from_document).collect()
    }

    async fn create_certificate(&self, input: NewCertificate) -> Result<Certificate, StoreError> {
        let document = self
            .client
            .create_document(
                self.database(),
                &self.config.certificates_collection_id,
                certificate_document(&input),
            )
            .await?;

        let certificate = certificate_from_document(&document)?;
        info!("Created certificate {} '{}'", certificate.id, certificate.title);
        Ok(certificate)
    }

    async fn delete_certificate(&self, id: &str) -> Result<(), StoreError> {
        self.client
            .delete_document(self.database(), &self.config.certificates_collection_id, id)
            .await
            .map_err(|e| missing_record(e, "Certificate", id))?;
        info!("Deleted certificate {}", id);
        Ok(())
    }

    async fn find_admin(&self, username: &str) -> Result<Option<Admin>, StoreError> {
        let queries = [query::equal("email", username), query::limit(1)];
        let documents = self
            .client
            .list_documents(self.database(), &self.config.admins_collection_id, &queries)
            .await?;

        documents.first().map(admin_from_document).transpose()
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<Option<Admin>, StoreError> {
        if !self.client.create_email_session(username, password).await? {
            warn!("Appwrite rejected login for '{}'", username);
            return Ok(None);
        }

        if let Some(admin) = self.find_admin(username).await? {
            return Ok(Some(admin));
        }

        // First successful login adds the account to the allow-list
        let document = self
            .client
            .create_document(
                self.database(),
                &self.config.admins_collection_id,
                json!({ "email": username }),
            )
            .await?;
        info!("Registered admin document for '{}'", username);
        admin_from_document(&document).map(Some)
    }

    async fn ensure_admin(&self, _username: &str, _password: &str) -> Result<bool, StoreError> {
        Ok(false)
    }

    async fn set_admin_password(&self, _username: &str, _password: &str) -> Result<(), StoreError> {
        Err(StoreError::Unsupported {
            backend: StoreBackend::Appwrite,
            operation: "set-password",
        })
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let queries = [query::limit(1)];
        self.client
            .list_documents(self.database(), &self.config.projects_collection_id, &queries)
            .await?;
        Ok(())
    }

    async fn close(&self) {}
}

/// A 404 from a by-id call means the record does not exist.
fn missing_record(err: AppwriteError, kind: &str, id: &str) -> StoreError {
    if err.is_not_found() {
        StoreError::NotFound(format!("{} {} not found", kind, id))
    } else {
        err.into()
    }
}

fn document_id(doc: &Value) -> Result<String, StoreError> {
    doc.get("$id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StoreError::Corrupt("document without $id".to_string()))
}

/// Non-empty string attribute.
fn text(doc: &Value, key: &str) -> Option<String> {
    doc.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn project_document(input: &NewProject, tags: TagFormat) -> Value {
    json!({
        "title": input.title,
        "short_description": input.short_description,
        "full_description": input.full_description,
        "tech_stack": tags.encode(&input.tech_stack),
        "image_url": input.image_url,
        "demo_url": input.demo_url,
        "repo_url": input.repo_url,
    })
}

fn certificate_document(input: &NewCertificate) -> Value {
    json!({
        "title": input.title,
        "issuer": input.issuer,
        "issue_date": input.issue_date,
        "credential_url": input.credential_url,
        "image_url": input.image_url,
        "status": input.status.as_str(),
        "progress_percent": input.progress_percent,
    })
}

pub(crate) fn project_from_document(doc: &Value, tags: TagFormat) -> Result<Project, StoreError> {
    // Collections created by hand may hold tags as a string array
    let tech_stack = match doc.get("tech_stack") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        other => tags.decode(other.and_then(Value::as_str)),
    };

    Ok(Project {
        id: document_id(doc)?.into(),
        title: text(doc, "title").unwrap_or_default(),
        short_description: text(doc, "short_description"),
        full_description: text(doc, "full_description"),
        tech_stack,
        image_url: text(doc, "image_url"),
        demo_url: text(doc, "demo_url"),
        repo_url: text(doc, "repo_url"),
        created_at: parse_timestamp(doc.get("$createdAt").and_then(Value::as_str)),
    })
}

pub(crate) fn certificate_from_document(doc: &Value) -> Result<Certificate, StoreError> {
    let id = document_id(doc)?;

    let status = match text(doc, "status") {
        None => CertificateStatus::default(),
        Some(raw) => raw
            .parse()
            .map_err(|_| StoreError::Corrupt(format!("certificate {} has status '{}'", id, raw)))?,
    };

    let progress_percent = match doc.get("progress_percent") {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(DEFAULT_PROGRESS),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(DEFAULT_PROGRESS),
        _ => DEFAULT_PROGRESS,
    };

    Ok(Certificate {
        id: id.into(),
        title: text(doc, "title").unwrap_or_default(),
        issuer: text(doc, "issuer"),
        issue_date: text(doc, "issue_date"),
        credential_url: text(doc, "credential_url"),
        image_url: text(doc, "image_url"),
        status,
        progress_percent,
        created_at: parse_timestamp(doc.get("$createdAt").and_then(Value::as_str)),
    })
}

fn admin_from_document(doc: &Value) -> Result<Admin, StoreError> {
    let email = text(doc, "email")
        .ok_or_else(|| StoreError::Corrupt("admin document without email".to_string()))?;

    Ok(Admin {
        id: document_id(doc)?.into(),
        username: email,
        password_hash: None,
    })
}
