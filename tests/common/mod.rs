#![allow(dead_code)]

pub mod fake_appwrite;

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use tempfile::TempDir;
use tokio::net::TcpListener;

use portfolio_api::config::AppConfig;
use portfolio_api::database::{bootstrap_admin, open_store};
use portfolio_api::storage::open_file_store;
use portfolio_api::{app, AppState};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Router served on a free local port, backed by a temp-dir SQLite store.
/// Lives as long as the test's runtime.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    pub dir: TempDir,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    pub async fn spawn_with(customize: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
            .with_test_writer()
            .try_init();

        let dir = tempfile::tempdir()?;
        let public_dir = dir.path().join("public");
        std::fs::create_dir_all(public_dir.join("admin"))?;
        std::fs::write(public_dir.join("index.html"), "<h1>Portfolio</h1>")?;
        std::fs::write(public_dir.join("admin").join("index.html"), "<h1>Admin</h1>")?;

        let mut config = AppConfig::from_lookup(|_| None);
        config.server.host = "127.0.0.1".to_string();
        config.server.public_dir = public_dir;
        config.server.upload_dir = dir.path().join("uploads");
        config.store.database_path = dir.path().join("portfolio.db");
        config.security.jwt_secret = "integration-test-secret".to_string();
        customize(&mut config);

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        config.server.port = port;
        let base_url = format!("http://127.0.0.1:{}", port);

        let store = open_store(&config).await?;
        bootstrap_admin(store.as_ref(), &config).await?;
        let files = open_file_store(&config).await?;

        let listener = TcpListener::bind(config.bind_addr()).await?;
        let router = app(AppState::new(config, store, files));
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let client = reqwest::Client::builder().cookie_store(true).build()?;
        let server = Self {
            port,
            base_url,
            client,
            dir,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Log in as the bootstrap admin; the session cookie stays in `client`.
    pub async fn login(&self) -> Result<()> {
        let res = self
            .client
            .post(self.url("/api/login"))
            .json(&serde_json::json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        Ok(())
    }

    pub async fn get_json(&self, path: &str) -> Result<serde_json::Value> {
        let res = self.client.get(self.url(path)).send().await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "GET {} returned {}", path, res.status());
        Ok(res.json().await?)
    }
}
