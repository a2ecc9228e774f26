//! Minimal Appwrite REST client: the database, storage and account calls the
//! portfolio needs, nothing more.
//!
//! Server-side calls authenticate with the project API key. Email/password
//! session creation is sent without the key, as a plain user client, so
//! Appwrite checks the credentials instead of the key's scopes.

pub mod query;

use reqwest::{multipart, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::config::AppwriteConfig;

#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("Appwrite {status}: {message}")]
    Api {
        status: u16,
        kind: String,
        message: String,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl AppwriteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppwriteError::Api { status: 404, .. })
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppwriteError::Api { status: 401, .. })
    }
}

/// Error body returned by Appwrite on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default, rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct DocumentList {
    #[serde(default)]
    documents: Vec<Value>,
}

#[derive(Clone)]
pub struct AppwriteClient {
    http: reqwest::Client,
    endpoint: String,
    project_id: String,
    api_key: String,
}

impl AppwriteClient {
    pub fn new(config: &AppwriteConfig) -> Result<Self, AppwriteError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("portfolio-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// Request carrying the project header only.
    fn user_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header("X-Appwrite-Project", &self.project_id)
    }

    /// Request authenticated with the server API key.
    fn admin_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.user_request(method, path)
            .header("X-Appwrite-Key", &self.api_key)
    }

    async fn send(request: RequestBuilder) -> Result<reqwest::Response, AppwriteError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: ErrorBody = response.json().await.unwrap_or(ErrorBody {
            message: status.canonical_reason().unwrap_or("request failed").to_string(),
            kind: String::new(),
        });
        Err(AppwriteError::Api {
            status: status.as_u16(),
            kind: body.kind,
            message: body.message,
        })
    }

    fn documents_path(database_id: &str, collection_id: &str) -> String {
        format!("/databases/{}/collections/{}/documents", database_id, collection_id)
    }

    pub async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[String],
    ) -> Result<Vec<Value>, AppwriteError> {
        let params: Vec<(&str, &str)> = queries.iter().map(|q| ("queries[]", q.as_str())).collect();
        let request = self
            .admin_request(Method::GET, &Self::documents_path(database_id, collection_id))
            .query(&params);

        let list: DocumentList = Self::send(request).await?.json().await?;
        debug!("Listed {} documents from {}", list.documents.len(), collection_id);
        Ok(list.documents)
    }

    pub async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        data: Value,
    ) -> Result<Value, AppwriteError> {
        let request = self
            .admin_request(Method::POST, &Self::documents_path(database_id, collection_id))
            .json(&json!({ "documentId": query::UNIQUE_ID, "data": data }));

        Ok(Self::send(request).await?.json().await?)
    }

    pub async fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Value, AppwriteError> {
        let path = format!("{}/{}", Self::documents_path(database_id, collection_id), document_id);
        let request = self
            .admin_request(Method::PATCH, &path)
            .json(&json!({ "data": data }));

        Ok(Self::send(request).await?.json().await?)
    }

    pub async fn delete_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<(), AppwriteError> {
        let path = format!("{}/{}", Self::documents_path(database_id, collection_id), document_id);
        Self::send(self.admin_request(Method::DELETE, &path)).await?;
        Ok(())
    }

    /// Upload a file to a bucket and return its id.
    pub async fn create_file(
        &self,
        bucket_id: &str,
        file_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<String, AppwriteError> {
        let mut part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        if let Some(mime) = content_type {
            part = part.mime_str(mime)?;
        }
        let form = multipart::Form::new()
            .text("fileId", query::UNIQUE_ID)
            .part("file", part);

        let path = format!("/storage/buckets/{}/files", bucket_id);
        let file: Value = Self::send(self.admin_request(Method::POST, &path).multipart(form))
            .await?
            .json()
            .await?;

        file.get("$id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AppwriteError::Api {
                status: StatusCode::BAD_GATEWAY.as_u16(),
                kind: "missing_file_id".to_string(),
                message: "Appwrite did not return a file id".to_string(),
            })
    }

    /// Public view URL for a stored file.
    pub fn file_view_url(&self, bucket_id: &str, file_id: &str) -> String {
        format!(
            "{}/storage/buckets/{}/files/{}/view?project={}",
            self.endpoint, bucket_id, file_id, self.project_id
        )
    }

    /// Check an email/password pair against Appwrite accounts. `Ok(false)`
    /// means the credentials were rejected.
    pub async fn create_email_session(&self, email: &str, password: &str) -> Result<bool, AppwriteError> {
        let request = self
            .user_request(Method::POST, "/account/sessions/email")
            .json(&json!({ "email": email, "password": password }));

        match Self::send(request).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_unauthorized() => Ok(false),
            Err(AppwriteError::Api { status: 400, .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
