//! Axum extractors for authentication.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::bearer::get_bearer_token;
use super::errors::AuthError;
use super::session::authenticate;
use super::state::HasAuthBackend;
use super::types::Principal;

/// Extractor for endpoints that require a valid access token in
/// `Authorization: Bearer <token>`.
///
/// Verification is stateless: no database lookup happens here.
pub struct Auth(pub Principal);

impl<S> FromRequestParts<S> for Auth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = get_bearer_token(&parts.headers)
            .map_err(|_| AuthError::Unauthorized("Missing or malformed access token"))?;

        authenticate(state.jwt(), token).map(Auth)
    }
}

/// Extractor for the raw refresh token in `Authorization: Bearer <token>`.
///
/// Only checks the header shape; the token itself is validated by the
/// session manager.
pub struct BearerRefreshToken(pub String);

impl<S> FromRequestParts<S> for BearerRefreshToken
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        get_bearer_token(&parts.headers)
            .map(|token| BearerRefreshToken(token.to_string()))
            .map_err(|_| AuthError::Unauthorized("Invalid or missing refresh token"))
    }
}
