use anyhow::Context;
use tokio::{
    net::TcpListener,
    signal::{self, ctrl_c},
};
use tracing::{info, warn};

use portfolio_api::config::AppConfig;
use portfolio_api::database::{bootstrap_admin, open_store};
use portfolio_api::storage::open_file_store;
use portfolio_api::{app, init_tracing, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up JWT_SECRET, APPWRITE_*, etc.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = AppConfig::from_env();
    info!(
        "Starting portfolio API in {:?} mode with the {} store",
        config.environment, config.store.backend
    );
    if config.uses_default_secret() {
        warn!("JWT_SECRET is not set; sessions are signed with the built-in default secret");
    }

    let store = open_store(&config).await.context("failed to open content store")?;
    store
        .health_check()
        .await
        .with_context(|| format!("the {} store is not reachable", config.store.backend))?;
    bootstrap_admin(store.as_ref(), &config)
        .await
        .context("failed to bootstrap admin account")?;
    let files = open_file_store(&config)
        .await
        .context("failed to prepare upload storage")?;

    let bind_addr = config.bind_addr();
    let state = AppState::new(config, store.clone(), files);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Portfolio API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.close().await;
    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
