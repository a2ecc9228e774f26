//! In-process stand-in for the slice of the Appwrite REST API the portfolio
//! uses. Every request is recorded so tests can assert on paths, headers,
//! query strings and bodies.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

use portfolio_api::config::{AppConfig, StoreBackend};

use super::{ADMIN_PASSWORD, ADMIN_USERNAME};

pub const PROJECT_ID: &str = "portfolio-test";
pub const API_KEY: &str = "server-api-key";
pub const COLLECTIONS: [&str; 3] = ["projects", "certificates", "admins"];

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub queries: Vec<Value>,
    pub project: Option<String>,
    pub api_key: Option<String>,
    pub body: Value,
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub id: String,
    pub requested_id: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
struct Backend {
    collections: HashMap<String, Vec<Value>>,
    requests: Vec<Recorded>,
    files: Vec<StoredFile>,
    next_document: u32,
}

type Shared = Arc<Mutex<Backend>>;

#[derive(Clone)]
pub struct FakeAppwrite {
    pub endpoint: String,
    backend: Shared,
}

impl FakeAppwrite {
    pub async fn spawn() -> Result<Self> {
        let mut backend = Backend::default();
        for name in COLLECTIONS {
            backend.collections.insert(name.to_string(), Vec::new());
        }
        let backend: Shared = Arc::new(Mutex::new(backend));

        let router = Router::new()
            .route(
                "/v1/databases/:database/collections/:collection/documents",
                get(list_documents).post(create_document),
            )
            .route(
                "/v1/databases/:database/collections/:collection/documents/:id",
                patch(update_document).delete(delete_document),
            )
            .route("/v1/storage/buckets/:bucket/files", post(create_file))
            .route("/v1/account/sessions/email", post(create_session))
            .with_state(backend.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr().context("fake appwrite address")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            endpoint: format!("http://{}/v1", addr),
            backend,
        })
    }

    /// Point `config` at this server.
    pub fn configure(&self, config: &mut AppConfig) {
        config.store.backend = StoreBackend::Appwrite;
        config.appwrite.endpoint = self.endpoint.clone();
        config.appwrite.project_id = PROJECT_ID.to_string();
        config.appwrite.api_key = API_KEY.to_string();
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.backend.lock().unwrap().requests.clone()
    }

    /// Recorded requests whose path ends with `suffix`.
    pub fn requests_to(&self, method: Method, suffix: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path.ends_with(suffix))
            .collect()
    }

    pub fn documents(&self, collection: &str) -> Vec<Value> {
        self.backend
            .lock()
            .unwrap()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn files(&self) -> Vec<StoredFile> {
        self.backend.lock().unwrap().files.clone()
    }
}

fn record(backend: &Shared, method: Method, uri: &Uri, headers: &HeaderMap, body: Value) -> Recorded {
    let queries = uri
        .query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .filter(|(key, _)| key == "queries[]")
                .filter_map(|(_, value)| serde_json::from_str(&value).ok())
                .collect()
        })
        .unwrap_or_default();
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);

    let recorded = Recorded {
        method,
        path: uri.path().to_string(),
        queries,
        project: header("x-appwrite-project"),
        api_key: header("x-appwrite-key"),
        body,
    };
    backend.lock().unwrap().requests.push(recorded.clone());
    recorded
}

fn appwrite_error(status: StatusCode, kind: &str, message: &str) -> Response {
    let body = json!({ "message": message, "type": kind, "code": status.as_u16() });
    (status, Json(body)).into_response()
}

fn collection_missing() -> Response {
    appwrite_error(
        StatusCode::NOT_FOUND,
        "collection_not_found",
        "Collection with the requested ID could not be found.",
    )
}

fn document_missing() -> Response {
    appwrite_error(
        StatusCode::NOT_FOUND,
        "document_not_found",
        "Document with the requested ID could not be found.",
    )
}

fn matches_query(doc: &Value, query: &Value) -> bool {
    if query["method"] != "equal" {
        return true;
    }
    let attribute = query["attribute"].as_str().unwrap_or_default();
    query["values"]
        .as_array()
        .is_some_and(|values| values.contains(&doc[attribute]))
}

async fn list_documents(
    State(backend): State<Shared>,
    Path((_database, collection)): Path<(String, String)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let queries = record(&backend, method, &uri, &headers, Value::Null).queries;

    let guard = backend.lock().unwrap();
    let Some(docs) = guard.collections.get(&collection) else {
        return collection_missing();
    };

    let mut documents: Vec<Value> = docs
        .iter()
        .filter(|doc| queries.iter().all(|q| matches_query(doc, q)))
        .cloned()
        .collect();
    if queries.iter().any(|q| q["method"] == "orderDesc") {
        documents.reverse();
    }

    Json(json!({ "total": documents.len(), "documents": documents })).into_response()
}

async fn create_document(
    State(backend): State<Shared>,
    Path((_database, collection)): Path<(String, String)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&backend, method, &uri, &headers, body.clone());

    let mut guard = backend.lock().unwrap();
    guard.next_document += 1;
    let n = guard.next_document;
    let Some(docs) = guard.collections.get_mut(&collection) else {
        return collection_missing();
    };

    let mut doc = body["data"].as_object().cloned().unwrap_or_else(Map::new);
    doc.insert("$id".into(), json!(format!("doc{}", n)));
    doc.insert("$createdAt".into(), json!(format!("2024-01-01T00:00:{:02}.000+00:00", n)));
    let doc = Value::Object(doc);
    docs.push(doc.clone());

    (StatusCode::CREATED, Json(doc)).into_response()
}

async fn update_document(
    State(backend): State<Shared>,
    Path((_database, collection, id)): Path<(String, String, String)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&backend, method, &uri, &headers, body.clone());

    let mut guard = backend.lock().unwrap();
    let Some(docs) = guard.collections.get_mut(&collection) else {
        return collection_missing();
    };
    let Some(doc) = docs.iter_mut().find(|doc| doc["$id"] == id.as_str()) else {
        return document_missing();
    };

    if let (Some(target), Some(data)) = (doc.as_object_mut(), body["data"].as_object()) {
        for (key, value) in data {
            target.insert(key.clone(), value.clone());
        }
    }
    Json(doc.clone()).into_response()
}

async fn delete_document(
    State(backend): State<Shared>,
    Path((_database, collection, id)): Path<(String, String, String)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    record(&backend, method, &uri, &headers, Value::Null);

    let mut guard = backend.lock().unwrap();
    let Some(docs) = guard.collections.get_mut(&collection) else {
        return collection_missing();
    };
    let before = docs.len();
    docs.retain(|doc| doc["$id"] != id.as_str());
    if docs.len() == before {
        return document_missing();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn create_file(
    State(backend): State<Shared>,
    Path(bucket): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut requested_id = String::new();
    let mut file = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "fileId" => requested_id = field.text().await.unwrap_or_default(),
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
                file = Some((file_name, bytes));
            }
            _ => {}
        }
    }

    let body = json!({
        "bucket": bucket,
        "fileId": requested_id,
        "file_name": file.as_ref().map(|(name, _)| name.clone()),
    });
    record(&backend, method, &uri, &headers, body);

    let Some((file_name, bytes)) = file else {
        return appwrite_error(StatusCode::BAD_REQUEST, "storage_file_empty", "No file sent");
    };

    let mut guard = backend.lock().unwrap();
    let id = format!("file{}", guard.files.len() + 1);
    guard.files.push(StoredFile {
        id: id.clone(),
        requested_id,
        file_name,
        bytes,
    });
    (StatusCode::CREATED, Json(json!({ "$id": id, "bucketId": bucket }))).into_response()
}

async fn create_session(
    State(backend): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&backend, method, &uri, &headers, body.clone());

    if body["email"] == ADMIN_USERNAME && body["password"] == ADMIN_PASSWORD {
        (StatusCode::CREATED, Json(json!({ "$id": "session1", "userId": "user1" }))).into_response()
    } else {
        appwrite_error(
            StatusCode::UNAUTHORIZED,
            "user_invalid_credentials",
            "Invalid credentials. Please check the email and password.",
        )
    }
}
