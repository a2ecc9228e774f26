use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::database::tags::TagFormat;

pub const DEFAULT_JWT_SECRET: &str = "your-default-secret-change-this";
pub const DEFAULT_APPWRITE_ENDPOINT: &str = "https://nyc.cloud.appwrite.io/v1";
/// Upper bound for `SESSION_TTL_SECS` (one year).
pub const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub appwrite: AppwriteConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub public_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Sqlite,
    Appwrite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database_path: PathBuf,
    pub tag_format: TagFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppwriteConfig {
    pub endpoint: String,
    pub project_id: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub database_id: String,
    pub projects_collection_id: String,
    pub certificates_collection_id: String,
    pub admins_collection_id: String,
    pub bucket_id: String,
}

/// How the admin session credential is carried and verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Signed JWT in the `token` cookie.
    Token,
    /// Signed identity cookie cross-checked against the admin allow-list.
    Claim,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub session_mode: SessionMode,
    pub session_ttl_secs: u64,
    pub cookie_secure: bool,
    pub admin_username: String,
    #[serde(skip_serializing)]
    pub admin_password: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_overrides(&lookup)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("PORTFOLIO_PORT").or_else(|| lookup("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Some(v) = lookup("PUBLIC_DIR") {
            self.server.public_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("UPLOAD_DIR") {
            self.server.upload_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("MAX_UPLOAD_BYTES") {
            self.server.max_upload_bytes = v.parse().unwrap_or(self.server.max_upload_bytes);
        }

        // Store overrides
        if let Some(v) = lookup("STORE_BACKEND") {
            self.store.backend = parse_or_warn("STORE_BACKEND", &v, self.store.backend);
        }
        if let Some(v) = lookup("DATABASE_PATH") {
            self.store.database_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("TAG_FORMAT") {
            self.store.tag_format = parse_or_warn("TAG_FORMAT", &v, self.store.tag_format);
        }

        // Appwrite overrides
        if let Some(v) = lookup("APPWRITE_ENDPOINT") {
            self.appwrite.endpoint = normalize_appwrite_endpoint(&v);
        }
        if let Some(v) = lookup("APPWRITE_PROJECT_ID") {
            self.appwrite.project_id = v;
        }
        if let Some(v) = lookup("APPWRITE_API_KEY") {
            self.appwrite.api_key = v;
        }
        if let Some(v) = lookup("APPWRITE_DB_ID") {
            self.appwrite.database_id = v;
        }
        if let Some(v) = lookup("APPWRITE_PROJECTS_COLLECTION_ID") {
            self.appwrite.projects_collection_id = v;
        }
        if let Some(v) = lookup("APPWRITE_CERTIFICATES_COLLECTION_ID") {
            self.appwrite.certificates_collection_id = v;
        }
        if let Some(v) = lookup("APPWRITE_ADMINS_COLLECTION_ID") {
            self.appwrite.admins_collection_id = v;
        }
        if let Some(v) = lookup("APPWRITE_BUCKET_ID") {
            self.appwrite.bucket_id = v;
        }

        // Security overrides
        if let Some(v) = lookup("JWT_SECRET") {
            if !v.is_empty() {
                self.security.jwt_secret = v;
            }
        }
        if let Some(v) = lookup("SESSION_MODE") {
            self.security.session_mode = parse_or_warn("SESSION_MODE", &v, self.security.session_mode);
        }
        if let Some(v) = lookup("SESSION_TTL_SECS") {
            self.security.session_ttl_secs = match v.parse::<u64>() {
                Ok(ttl) if ttl > MAX_SESSION_TTL_SECS => {
                    tracing::warn!("SESSION_TTL_SECS {} is too large, capping at {}", ttl, MAX_SESSION_TTL_SECS);
                    MAX_SESSION_TTL_SECS
                }
                Ok(ttl) => ttl,
                Err(_) => parse_or_warn("SESSION_TTL_SECS", &v, self.security.session_ttl_secs),
            };
        }
        if let Some(v) = lookup("COOKIE_SECURE") {
            self.security.cookie_secure = v.parse().unwrap_or(self.security.cookie_secure);
        }
        if let Some(v) = lookup("ADMIN_USERNAME") {
            self.security.admin_username = v;
        }
        if let Some(v) = lookup("ADMIN_PASSWORD") {
            self.security.admin_password = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig::default(),
            store: StoreConfig {
                backend: StoreBackend::Sqlite,
                database_path: PathBuf::from("portfolio.db"),
                tag_format: TagFormat::Json,
            },
            appwrite: AppwriteConfig::default(),
            security: SecurityConfig {
                jwt_secret: DEFAULT_JWT_SECRET.to_string(),
                session_mode: SessionMode::Token,
                session_ttl_secs: 3600,
                cookie_secure: false,
                admin_username: "admin".to_string(),
                admin_password: "admin123".to_string(),
            },
        }
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.security.cookie_secure = true;
        config
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Largest accepted request body: one upload plus form overhead.
    pub fn body_limit(&self) -> usize {
        self.server.max_upload_bytes + 1024 * 1024
    }

    pub fn uses_default_secret(&self) -> bool {
        self.security.jwt_secret == DEFAULT_JWT_SECRET
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_dir: PathBuf::from("public"),
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 5 * 1024 * 1024, // 5MB
        }
    }
}

impl Default for AppwriteConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_APPWRITE_ENDPOINT.to_string(),
            project_id: String::new(),
            api_key: String::new(),
            database_id: "portfoliop-db".to_string(),
            projects_collection_id: "projects".to_string(),
            certificates_collection_id: "certificates".to_string(),
            admins_collection_id: "admins".to_string(),
            bucket_id: "uploads".to_string(),
        }
    }
}

/// Appwrite Cloud projects live in the `nyc` region; a bare
/// `cloud.appwrite.io` endpoint is pinned to it.
pub fn normalize_appwrite_endpoint(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    match url::Url::parse(trimmed) {
        Ok(url) => {
            let host = url.host_str().unwrap_or_default();
            if host.ends_with("cloud.appwrite.io") && !host.starts_with("nyc.") {
                DEFAULT_APPWRITE_ENDPOINT.to_string()
            } else {
                trimmed.to_string()
            }
        }
        Err(_) => {
            tracing::warn!("APPWRITE_ENDPOINT '{}' is not a valid URL, using default", raw);
            DEFAULT_APPWRITE_ENDPOINT.to_string()
        }
    }
}

fn parse_or_warn<T>(key: &str, value: &str, fallback: T) -> T
where
    T: FromStr + Copy,
{
    value.parse().unwrap_or_else(|_| {
        tracing::warn!("Unrecognised {} value '{}', keeping default", key, value);
        fallback
    })
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "appwrite" => Ok(StoreBackend::Appwrite),
            other => Err(format!("unknown store backend: {}", other)),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Sqlite => write!(f, "sqlite"),
            StoreBackend::Appwrite => write!(f, "appwrite"),
        }
    }
}

impl FromStr for SessionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "token" | "jwt" => Ok(SessionMode::Token),
            "claim" | "cookie" => Ok(SessionMode::Claim),
            other => Err(format!("unknown session mode: {}", other)),
        }
    }
}
