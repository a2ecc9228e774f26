use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::{info, warn};

use crate::auth::password::{hash_password, is_legacy_hash, verify_password};
use crate::config::StoreBackend;

use super::manager::StoreError;
use super::models::{
    format_timestamp, parse_timestamp, Admin, Certificate, CertificateStatus, NewCertificate, NewProject,
    Project,
};
use super::store::ContentStore;
use super::tags::TagFormat;

const PROJECT_COLUMNS: &str = "id, title, short_description, full_description, tech_stack, \
                               image_url, demo_url, repo_url, created_at";

const CERTIFICATE_COLUMNS: &str = "id, title, issuer, issue_date, credential_url, image_url, \
                                   status, progress_percent, created_at";

#[derive(Debug, FromRow)]
struct ProjectRow {
    id: i64,
    title: String,
    short_description: Option<String>,
    full_description: Option<String>,
    tech_stack: Option<String>,
    image_url: Option<String>,
    demo_url: Option<String>,
    repo_url: Option<String>,
    created_at: Option<String>,
}

impl ProjectRow {
    fn into_project(self, tags: TagFormat) -> Project {
        Project {
            id: self.id.into(),
            title: self.title,
            short_description: self.short_description,
            full_description: self.full_description,
            tech_stack: tags.decode(self.tech_stack.as_deref()),
            image_url: self.image_url,
            demo_url: self.demo_url,
            repo_url: self.repo_url,
            created_at: parse_timestamp(self.created_at.as_deref()),
        }
    }
}

#[derive(Debug, FromRow)]
struct CertificateRow {
    id: i64,
    title: String,
    issuer: Option<String>,
    issue_date: Option<String>,
    credential_url: Option<String>,
    image_url: Option<String>,
    status: Option<String>,
    progress_percent: Option<i64>,
    created_at: Option<String>,
}

impl CertificateRow {
    fn into_certificate(self) -> Result<Certificate, StoreError> {
        let status = match self.status.as_deref() {
            None => CertificateStatus::default(),
            Some(raw) => raw
                .parse()
                .map_err(|_| StoreError::Corrupt(format!("certificate {} has status '{}'", self.id, raw)))?,
        };

        Ok(Certificate {
            id: self.id.into(),
            title: self.title,
            issuer: self.issuer,
            issue_date: self.issue_date,
            credential_url: self.credential_url,
            image_url: self.image_url,
            status,
            progress_percent: self.progress_percent.unwrap_or(100),
            created_at: parse_timestamp(self.created_at.as_deref()),
        })
    }
}

#[derive(Debug, FromRow)]
struct AdminRow {
    id: i64,
    username: String,
    password_hash: String,
}

impl From<AdminRow> for Admin {
    fn from(row: AdminRow) -> Self {
        Admin {
            id: row.id.into(),
            username: row.username,
            password_hash: Some(row.password_hash),
        }
    }
}

/// Content store backed by a local SQLite file.
pub struct SqliteStore {
    pool: SqlitePool,
    tags: TagFormat,
}

impl SqliteStore {
    /// Open (creating if needed) the database file and apply migrations.
    pub async fn open(path: &Path, tags: TagFormat) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!(backend = "sqlite", path = %path.display(), "Content store ready");

        Ok(Self { pool, tags })
    }

    /// Ids are integers here; anything else cannot name a row.
    fn row_id(kind: &str, id: &str) -> Result<i64, StoreError> {
        id.trim()
            .parse()
            .map_err(|_| StoreError::NotFound(format!("{} {} not found", kind, id)))
    }
}

/// `RETURNING` statements are read with `fetch_all` so the write runs to
/// completion before the connection goes back to the pool.
fn first_row<T>(rows: Vec<T>) -> Result<T, StoreError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| StoreError::Corrupt("insert returned no row".to_string()))
}

#[async_trait]
impl ContentStore for SqliteStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Sqlite
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let sql = format!(
            "SELECT {} FROM projects ORDER BY julianday(created_at) DESC, id DESC",
            PROJECT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ProjectRow>(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|r| r.into_project(self.tags)).collect())
    }

    async fn create_project(&self, input: NewProject) -> Result<Project, StoreError> {
        let sql = format!(
            "INSERT INTO projects (title, short_description, full_description, tech_stack, \
             image_url, demo_url, repo_url, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {}",
            PROJECT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(&input.title)
            .bind(&input.short_description)
            .bind(&input.full_description)
            .bind(self.tags.encode(&input.tech_stack))
            .bind(&input.image_url)
            .bind(&input.demo_url)
            .bind(&input.repo_url)
            .bind(format_timestamp(Utc::now()))
            .fetch_all(&self.pool)
            .await?;
        let row = first_row(rows)?;

        info!("Created project {} '{}'", row.id, row.title);
        Ok(row.into_project(self.tags))
    }

    async fn update_project(&self, id: &str, input: NewProject) -> Result<Project, StoreError> {
        let row_id = Self::row_id("Project", id)?;
        let sql = format!(
            "UPDATE projects SET title = ?, short_description = ?, full_description = ?, \
             tech_stack = ?, image_url = ?, demo_url = ?, repo_url = ? WHERE id = ? RETURNING {}",
            PROJECT_COLUMNS
        );
        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(&input.title)
            .bind(&input.short_description)
            .bind(&input.full_description)
            .bind(self.tags.encode(&input.tech_stack))
            .bind(&input.image_url)
            .bind(&input.demo_url)
            .bind(&input.repo_url)
            .bind(row_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(format!("Project {} not found", id)))?;

        info!("Updated project {}", row.id);
        Ok(row.into_project(self.tags))
    }

    async fn delete_project(&self, id: &str) -> Result<(), StoreError> {
        let row_id = Self::row_id("Project", id)?;
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(row_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Project {} not found", id)));
        }
        info!("Deleted project {}", row_id);
        Ok(())
    }

    async fn list_certificates(&self) -> Result<Vec<Certificate>, StoreError> {
        let sql = format!(
            "SELECT {} FROM certificates ORDER BY julianday(created_at) ASC, id ASC",
            CERTIFICATE_COLUMNS
        );
        let rows = sqlx::query_as::<_, CertificateRow>(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(CertificateRow::into_certificate).collect()
    }

    async fn create_certificate(&self, input: NewCertificate) -> Result<Certificate, StoreError> {
        let sql = format!(
            "INSERT INTO certificates (title, issuer, issue_date, credential_url, image_url, \
             status, progress_percent, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {}",
            CERTIFICATE_COLUMNS
        );
        let rows = sqlx::query_as::<_, CertificateRow>(&sql)
            .bind(&input.title)
            .bind(&input.issuer)
            .bind(&input.issue_date)
            .bind(&input.credential_url)
            .bind(&input.image_url)
            .bind(input.status.as_str())
            .bind(input.progress_percent)
            .bind(format_timestamp(Utc::now()))
            .fetch_all(&self.pool)
            .await?;
        let row = first_row(rows)?;

        info!("Created certificate {} '{}'", row.id, row.title);
        row.into_certificate()
    }

    async fn delete_certificate(&self, id: &str) -> Result<(), StoreError> {
        let row_id = Self::row_id("Certificate", id)?;
        let result = sqlx::query("DELETE FROM certificates WHERE id = ?")
            .bind(row_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Certificate {} not found", id)));
        }
        info!("Deleted certificate {}", row_id);
        Ok(())
    }

    async fn find_admin(&self, username: &str) -> Result<Option<Admin>, StoreError> {
        let row = sqlx::query_as::<_, AdminRow>(
            "SELECT id, username, password_hash FROM admin WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Admin::from))
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<Option<Admin>, StoreError> {
        let Some(admin) = self.find_admin(username).await? else {
            warn!("Login attempt for unknown admin '{}'", username);
            return Ok(None);
        };

        let verified = admin
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(password, hash));
        if !verified {
            warn!("Wrong password for admin '{}'", username);
            return Ok(None);
        }

        if admin.password_hash.as_deref().is_some_and(is_legacy_hash) {
            match self.set_admin_password(username, password).await {
                Ok(()) => info!("Upgraded legacy bcrypt hash for admin '{}'", username),
                Err(e) => warn!("Could not upgrade legacy hash for admin '{}': {}", username, e),
            }
        }

        Ok(Some(admin))
    }

    async fn ensure_admin(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        if self.find_admin(username).await?.is_some() {
            return Ok(false);
        }

        let hash = hash_password(password).map_err(StoreError::Hash)?;
        let result = sqlx::query(
            "INSERT INTO admin (username, password_hash) VALUES (?, ?) ON CONFLICT(username) DO NOTHING",
        )
        .bind(username)
        .bind(hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn set_admin_password(&self, username: &str, password: &str) -> Result<(), StoreError> {
        let hash = hash_password(password).map_err(StoreError::Hash)?;
        let result = sqlx::query("UPDATE admin SET password_hash = ? WHERE username = ?")
            .bind(hash)
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Admin '{}' not found", username)));
        }
        info!("Password updated for admin '{}'", username);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
