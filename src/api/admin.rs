//! Admin and operational endpoints.
//!
//! - GET `/metrics` - HTML page with the file server hit count
//! - POST `/reset` - Wipe all data and the hit counter (dev platform only)
//!
//! [`healthz`] is mounted separately under `/api`.

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse},
    routing::{get, post},
};
use std::sync::Arc;
use tracing::{info, warn};

use super::error::{ApiError, ResultExt};
use crate::cli::Platform;
use crate::db::Database;
use crate::metrics::HitCounter;

#[derive(Clone)]
pub struct AdminState {
    pub db: Database,
    pub hits: Arc<HitCounter>,
    pub platform: Platform,
}

pub fn router(state: AdminState) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/reset", post(reset))
        .with_state(state)
}

fn render_metrics(hits: u64) -> String {
    format!(
        r#"<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {hits} times!</p>
  </body>
</html>"#
    )
}

async fn metrics(State(state): State<AdminState>) -> impl IntoResponse {
    Html(render_metrics(state.hits.get()))
}

async fn reset(State(state): State<AdminState>) -> Result<impl IntoResponse, ApiError> {
    if state.platform != Platform::Dev {
        warn!("Rejected reset request outside dev platform");
        return Err(ApiError::forbidden(
            "This endpoint is only available in development mode",
        ));
    }

    state.db.reset().await.db_err("Failed to reset database")?;
    state.hits.reset();

    info!("Database and hit counter reset");
    Ok((StatusCode::OK, "Hits reset to 0 and database cleared"))
}

/// Liveness probe.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "OK",
    )
}
