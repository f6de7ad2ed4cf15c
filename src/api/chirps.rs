//! Chirps API.
//!
//! Reads are public. Creating and deleting require an access token, and only
//! the author may delete a chirp.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::error::{ApiError, JsonBody, ResultExt, validate_uuid};
use crate::auth::{Auth, authorize_owner};
use crate::db::{Chirp, ChirpOrder, Database};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;

/// Maximum chirp length, in characters.
pub const MAX_CHIRP_LENGTH: usize = 140;

const BANNED_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];
const CENSORED: &str = "****";

#[derive(Clone)]
pub struct ChirpsState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl_has_auth_backend!(ChirpsState);

pub fn router(state: ChirpsState) -> Router {
    Router::new()
        .route("/", get(list_chirps).post(create_chirp))
        .route("/{chirp_id}", get(get_chirp).delete(delete_chirp))
        .with_state(state)
}

#[derive(Deserialize)]
struct CreateChirpRequest {
    body: String,
}

#[derive(Deserialize)]
struct ListQuery {
    author_id: Option<String>,
    sort: Option<String>,
}

#[derive(Serialize)]
struct ChirpResponse {
    id: String,
    body: String,
    user_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<Chirp> for ChirpResponse {
    fn from(chirp: Chirp) -> Self {
        Self {
            id: chirp.id,
            body: chirp.body,
            user_id: chirp.user_id,
            created_at: chirp.created_at,
            updated_at: chirp.updated_at,
        }
    }
}

/// Replace banned words with `****`.
///
/// Matching is per space-separated word and case-insensitive. Words with
/// attached punctuation (`Fornax!`) are left alone.
fn clean_body(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            let lowered = word.to_lowercase();
            if BANNED_WORDS.contains(&lowered.as_str()) {
                CENSORED
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn validate_body(body: &str) -> Result<(), ApiError> {
    if body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(ApiError::bad_request("Chirp is too long"));
    }
    Ok(())
}

fn parse_order(sort: Option<&str>) -> ChirpOrder {
    match sort {
        Some(s) if s.eq_ignore_ascii_case("asc") => ChirpOrder::Asc,
        _ => ChirpOrder::Desc,
    }
}

async fn create_chirp(
    State(state): State<ChirpsState>,
    Auth(principal): Auth,
    JsonBody(payload): JsonBody<CreateChirpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_body(&payload.body)?;
    let body = clean_body(&payload.body);

    // A valid token can outlive its user (e.g. after an admin reset).
    let chirp = match state.db.chirps().create(&principal.subject, &body).await {
        Ok(chirp) => chirp,
        Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
            return Err(ApiError::not_found("User not found"));
        }
        Err(e) => return Err(ApiError::db_error("Failed to create chirp", e)),
    };

    Ok((StatusCode::CREATED, Json(ChirpResponse::from(chirp))))
}

async fn list_chirps(
    State(state): State<ChirpsState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let author_id = match query.author_id.as_deref() {
        Some("") | None => None,
        Some(id) => {
            validate_uuid(id)?;
            Some(id)
        }
    };

    let chirps = state
        .db
        .chirps()
        .list(author_id, parse_order(query.sort.as_deref()))
        .await
        .db_err("Failed to list chirps")?;

    let response: Vec<ChirpResponse> = chirps.into_iter().map(ChirpResponse::from).collect();
    Ok(Json(response))
}

async fn get_chirp(
    State(state): State<ChirpsState>,
    Path(chirp_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    validate_uuid(&chirp_id)?;

    let chirp = state
        .db
        .chirps()
        .get_by_id(&chirp_id)
        .await
        .db_err("Failed to get chirp")?
        .ok_or_else(|| ApiError::not_found("Chirp not found"))?;

    Ok(Json(ChirpResponse::from(chirp)))
}

async fn delete_chirp(
    State(state): State<ChirpsState>,
    Auth(principal): Auth,
    Path(chirp_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    validate_uuid(&chirp_id)?;

    let chirp = state
        .db
        .chirps()
        .get_by_id(&chirp_id)
        .await
        .db_err("Failed to get chirp")?
        .ok_or_else(|| ApiError::not_found("Chirp not found"))?;

    authorize_owner(&principal, &chirp)?;

    let deleted = state
        .db
        .chirps()
        .delete(&chirp.id)
        .await
        .db_err("Failed to delete chirp")?;

    if !deleted {
        return Err(ApiError::not_found("Chirp not found"));
    }

    info!(chirp_id = %chirp.id, user_id = %principal.subject, "Chirp deleted");
    Ok(StatusCode::NO_CONTENT)
}
