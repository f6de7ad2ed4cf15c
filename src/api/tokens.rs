//! Session endpoints.
//!
//! - POST `/login` - Exchange email and password for an access/refresh token pair
//! - POST `/refresh` - Exchange a refresh token for a new access token
//! - POST `/revoke` - Revoke a refresh token

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use super::error::{ApiError, JsonBody};
use super::users::UserResponse;
use crate::auth::{AuthError, BearerRefreshToken, SessionManager};

#[derive(Clone)]
pub struct TokensState {
    pub sessions: SessionManager,
}

pub fn router(state: TokensState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/revoke", post(revoke))
        .with_state(state)
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
    expires_in_seconds: Option<u64>,
}

#[derive(Serialize)]
struct LoginResponse {
    #[serde(flatten)]
    user: UserResponse,
    token: String,
    refresh_token: String,
}

#[derive(Serialize)]
struct RefreshResponse {
    token: String,
}

async fn login(
    State(state): State<TokensState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = payload.email.trim();
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let session = state
        .sessions
        .login(
            email,
            &payload.password,
            payload.expires_in_seconds.map(Duration::from_secs),
        )
        .await?;

    Ok(Json(LoginResponse {
        user: UserResponse::from(&session.user),
        token: session.access_token.token,
        refresh_token: session.refresh_token,
    }))
}

async fn refresh(
    State(state): State<TokensState>,
    BearerRefreshToken(token): BearerRefreshToken,
) -> Result<impl IntoResponse, ApiError> {
    let access = state.sessions.refresh(&token).await?;
    Ok(Json(RefreshResponse {
        token: access.token,
    }))
}

async fn revoke(
    State(state): State<TokensState>,
    BearerRefreshToken(token): BearerRefreshToken,
) -> Result<impl IntoResponse, ApiError> {
    match state.sessions.revoke(&token).await {
        Ok(()) => {
            info!("Refresh token revoked");
            Ok(StatusCode::NO_CONTENT)
        }
        // An unknown token is indistinguishable from a bad credential here.
        Err(AuthError::NotFound(_)) => Err(ApiError::unauthorized("Invalid refresh token")),
        Err(e) => Err(e.into()),
    }
}
