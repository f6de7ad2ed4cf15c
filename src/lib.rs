pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod jwt;
pub mod metrics;
pub mod password;

use api::{create_admin_router, create_api_router};
use axum::{Router, middleware};
use cli::Platform;
use db::Database;
use jwt::JwtConfig;
use metrics::{HitCounter, count_hits};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// JWT secret for signing access tokens
    pub jwt_secret: Vec<u8>,
    /// API key the Polka webhook must present
    pub polka_key: Arc<str>,
    /// Deployment platform
    pub platform: Platform,
    /// Directory served under `/app`
    pub assets_dir: PathBuf,
    /// File server hit counter, shared with the admin endpoints
    pub hits: Arc<HitCounter>,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let jwt = Arc::new(JwtConfig::new(&config.jwt_secret));

    let api_router = create_api_router(config.db.clone(), jwt, config.polka_key.clone());

    let admin_router =
        create_admin_router(config.db.clone(), config.hits.clone(), config.platform);

    // Every request under /app counts, including misses.
    let app_files = Router::new()
        .fallback_service(ServeDir::new(&config.assets_dir))
        .layer(middleware::from_fn_with_state(
            config.hits.clone(),
            count_hits,
        ));

    Router::new()
        .nest("/api", api_router)
        .nest("/admin", admin_router)
        .nest_service("/app", app_files)
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await
}
