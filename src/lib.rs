pub mod appwrite;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod storage;

#[cfg(test)]
pub mod testing;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

pub use state::AppState;

const DEFAULT_LOG_FILTER: &str = "portfolio_api=info,tower_http=info";

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let server = &state.config.server;
    let admin_page = ServeFile::new(server.public_dir.join("admin").join("index.html"));
    let uploads = ServeDir::new(&server.upload_dir);
    let site = ServeDir::new(&server.public_dir);
    let body_limit = state.config.body_limit();

    Router::new()
        .route("/health", get(handlers::public::health_get))
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .route_service("/admin", admin_page)
        .nest_service("/uploads", uploads)
        .fallback_service(site)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("SAMEORIGIN"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::REFERRER_POLICY,
                    HeaderValue::from_static("no-referrer"),
                ))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public::{auth, content};

    Router::new()
        // Session management
        .route("/api/login", post(auth::session_login))
        .route("/api/logout", post(auth::session_logout))
        // Content read by the public site
        .route("/api/projects", get(content::projects_get))
        .route("/api/certificates", get(content::certificates_get))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use axum::routing::delete;
    use handlers::protected::{auth, content};

    Router::new()
        .route("/api/check-auth", get(auth::session_check))
        // Projects
        .route("/api/projects", post(content::project_post))
        .route(
            "/api/projects/:id",
            put(content::project_put).delete(content::project_delete),
        )
        // Certificates
        .route("/api/certificates", post(content::certificate_post))
        .route("/api/certificates/:id", delete(content::certificate_delete))
        .route_layer(from_fn_with_state(state, middleware::require_admin))
}
