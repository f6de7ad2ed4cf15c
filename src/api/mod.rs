mod admin;
mod chirps;
mod error;
mod tokens;
mod users;
mod webhooks;

use axum::{Router, routing::get};
use std::sync::Arc;

use crate::auth::SessionManager;
use crate::cli::Platform;
use crate::db::Database;
use crate::jwt::JwtConfig;
use crate::metrics::HitCounter;

pub use admin::AdminState;
pub use chirps::MAX_CHIRP_LENGTH;
pub use error::ApiError;
pub use users::UsersState;

/// Create the `/api` router.
pub fn create_api_router(db: Database, jwt: Arc<JwtConfig>, polka_key: Arc<str>) -> Router {
    let users_state = users::UsersState {
        db: db.clone(),
        jwt: jwt.clone(),
    };

    let chirps_state = chirps::ChirpsState {
        db: db.clone(),
        jwt: jwt.clone(),
    };

    let tokens_state = tokens::TokensState {
        sessions: SessionManager::new(db.clone(), jwt),
    };

    let webhooks_state = webhooks::WebhooksState { db, polka_key };

    Router::new()
        .route("/healthz", get(admin::healthz))
        .nest("/users", users::router(users_state))
        .nest("/chirps", chirps::router(chirps_state))
        .nest("/polka", webhooks::router(webhooks_state))
        .merge(tokens::router(tokens_state))
}

/// Create the `/admin` router.
pub fn create_admin_router(db: Database, hits: Arc<HitCounter>, platform: Platform) -> Router {
    admin::router(AdminState { db, hits, platform })
}
