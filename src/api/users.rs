//! User account endpoints.
//!
//! - POST `/` - Create an account
//! - PUT `/` - Update the caller's own email and password
//!
//! Updates always target the token's subject, so there is no other user's
//! record to guard against.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ApiError, JsonBody, ResultExt};
use crate::auth::Auth;
use crate::db::{Database, User};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;
use crate::password::hash_password_blocking;

/// Longest accepted email address.
const MAX_EMAIL_LENGTH: usize = 254;

#[derive(Clone)]
pub struct UsersState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl_has_auth_backend!(UsersState);

pub fn router(state: UsersState) -> Router {
    Router::new()
        .route("/", post(create_user).put(update_user))
        .with_state(state)
}

#[derive(Deserialize)]
struct UserRequest {
    email: String,
    password: String,
}

/// Public profile fields. Never includes the password hash.
#[derive(Serialize)]
pub(super) struct UserResponse {
    id: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    is_chirpy_red: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

/// Check and normalize an email/password pair.
fn validate_credentials(payload: &UserRequest) -> Result<&str, ApiError> {
    let email = payload.email.trim();

    if email.is_empty() {
        return Err(ApiError::bad_request("Email cannot be empty"));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ApiError::bad_request("Email is too long"));
    }

    if !email.contains('@') {
        return Err(ApiError::bad_request("Email is invalid"));
    }

    if payload.password.is_empty() {
        return Err(ApiError::bad_request("Password cannot be empty"));
    }

    Ok(email)
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

async fn create_user(
    State(state): State<UsersState>,
    JsonBody(payload): JsonBody<UserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = validate_credentials(&payload)?;

    let available = state
        .db
        .users()
        .is_email_available(email)
        .await
        .db_err("Failed to check email availability")?;

    if !available {
        return Err(ApiError::conflict("Email is already registered"));
    }

    let hashed_password = hash_password_blocking(payload.password.clone())
        .await
        .map_err(|e| ApiError::internal_error("Failed to hash password", e))?;

    let user = match state.db.users().create(email, &hashed_password).await {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::conflict("Email is already registered"));
        }
        Err(e) => return Err(ApiError::db_error("Failed to create user", e)),
    };

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

async fn update_user(
    State(state): State<UsersState>,
    Auth(principal): Auth,
    JsonBody(payload): JsonBody<UserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = validate_credentials(&payload)?;

    let hashed_password = hash_password_blocking(payload.password.clone())
        .await
        .map_err(|e| ApiError::internal_error("Failed to hash password", e))?;

    let updated = match state
        .db
        .users()
        .update(&principal.subject, email, &hashed_password)
        .await
    {
        Ok(Some(updated)) => updated,
        Ok(None) => return Err(ApiError::not_found("User not found")),
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::conflict("Email is already registered"));
        }
        Err(e) => return Err(ApiError::db_error("Failed to update user", e)),
    };

    Ok((StatusCode::OK, Json(UserResponse::from(&updated))))
}
