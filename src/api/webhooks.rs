//! Payment provider webhooks.
//!
//! - POST `/webhooks` - Receive Polka events (`Authorization: ApiKey <key>`)

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use serde::Deserialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{debug, info};

use super::error::{ApiError, ResultExt, validate_uuid};
use crate::auth::get_api_key;
use crate::db::Database;

/// The only event that changes anything.
pub const USER_UPGRADED_EVENT: &str = "user.upgraded";

#[derive(Clone)]
pub struct WebhooksState {
    pub db: Database,
    pub polka_key: Arc<str>,
}

pub fn router(state: WebhooksState) -> Router {
    Router::new()
        .route("/webhooks", post(polka_webhook))
        .with_state(state)
}

#[derive(Deserialize)]
struct WebhookEvent {
    event: String,
    #[serde(default)]
    data: WebhookData,
}

#[derive(Deserialize, Default)]
struct WebhookData {
    #[serde(default)]
    user_id: String,
}

fn key_matches(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

async fn polka_webhook(
    State(state): State<WebhooksState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let key = get_api_key(&headers).map_err(|_| ApiError::unauthorized("Missing API key"))?;
    if !key_matches(key, &state.polka_key) {
        return Err(ApiError::unauthorized("Invalid API key"));
    }

    // Decoded only once the caller is known.
    let payload: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("Invalid webhook payload: {}", e)))?;

    if payload.event != USER_UPGRADED_EVENT {
        debug!(event = %payload.event, "Ignoring webhook event");
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = payload.data.user_id.trim();
    validate_uuid(user_id)?;

    let upgraded = state
        .db
        .users()
        .upgrade_to_red(user_id)
        .await
        .db_err("Failed to upgrade user")?;

    if !upgraded {
        return Err(ApiError::not_found("User not found"));
    }

    info!(user_id = %user_id, "User upgraded to Chirpy Red");
    Ok(StatusCode::NO_CONTENT)
}
