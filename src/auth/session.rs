//! Session lifecycle: login, access token refresh and refresh token revocation.
//!
//! Access tokens are stateless JWTs (see [`crate::jwt`]). Refresh tokens are
//! 256-bit random hex strings stored in the database; all session state lives
//! there, so nothing here holds locks or shared mutable state.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::RngCore;
use tracing::info;

use super::errors::AuthError;
use super::types::Principal;
use crate::db::{Database, User};
use crate::jwt::{AccessTokenResult, JwtConfig};
use crate::password;

/// Refresh token lifetime in days.
pub const REFRESH_TOKEN_DURATION_DAYS: i64 = 60;

/// Random bytes per refresh token (hex encoded to twice this length).
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a new opaque refresh token value.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Everything a successful login hands back to the caller.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: User,
    pub access_token: AccessTokenResult,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionManager {
    db: Database,
    jwt: Arc<JwtConfig>,
}

impl SessionManager {
    pub fn new(db: Database, jwt: Arc<JwtConfig>) -> Self {
        Self { db, jwt }
    }

    pub fn jwt(&self) -> &JwtConfig {
        &self.jwt
    }

    /// Verify email and password, then issue an access token and a new
    /// persisted refresh token.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        access_ttl: Option<Duration>,
    ) -> Result<LoginSession, AuthError> {
        let user = self
            .db
            .users()
            .get_by_email(email)
            .await
            .map_err(|e| AuthError::internal("Failed to get user", e))?
            .ok_or(AuthError::NotFound("User not found"))?;

        let matches =
            password::verify_password_blocking(password.to_string(), user.hashed_password.clone())
                .await
                .map_err(|e| AuthError::internal("Failed to verify password", e))?;

        if !matches {
            return Err(AuthError::Unauthorized("Invalid password"));
        }

        let access_token = self.issue_access_token(&user.id, access_ttl)?;

        let refresh_token = generate_refresh_token();
        let refresh_expires_at = Utc::now() + chrono::Duration::days(REFRESH_TOKEN_DURATION_DAYS);
        self.db
            .refresh_tokens()
            .create(&refresh_token, &user.id, refresh_expires_at)
            .await
            .map_err(|e| AuthError::internal("Failed to store refresh token", e))?;

        info!(user_id = %user.id, "User logged in");

        Ok(LoginSession {
            user,
            access_token,
            refresh_token,
            refresh_expires_at,
        })
    }

    /// Exchange a stored refresh token for a new access token.
    ///
    /// The refresh token is not rotated; it stays usable until it expires or
    /// is revoked.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AccessTokenResult, AuthError> {
        let stored = self
            .db
            .refresh_tokens()
            .get(refresh_token)
            .await
            .map_err(|e| AuthError::internal("Failed to get refresh token", e))?
            .ok_or(AuthError::Unauthorized("Invalid refresh token"))?;

        if stored.revoked_at.is_some() {
            return Err(AuthError::Unauthorized("Refresh token has been revoked"));
        }

        if !stored.is_usable_at(Utc::now()) {
            return Err(AuthError::Unauthorized("Refresh token has expired"));
        }

        self.issue_access_token(&stored.user_id, None)
    }

    /// Mark a stored refresh token as revoked.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError> {
        let revoked = self
            .db
            .refresh_tokens()
            .revoke(refresh_token)
            .await
            .map_err(|e| AuthError::internal("Failed to revoke refresh token", e))?;

        if !revoked {
            return Err(AuthError::NotFound("Refresh token not found"));
        }

        Ok(())
    }

    /// Resolve an access token into the calling principal.
    pub fn authenticate(&self, access_token: &str) -> Result<Principal, AuthError> {
        authenticate(&self.jwt, access_token)
    }

    fn issue_access_token(
        &self,
        user_id: &str,
        ttl: Option<Duration>,
    ) -> Result<AccessTokenResult, AuthError> {
        self.jwt
            .generate_access_token(user_id, ttl)
            .map_err(|e| AuthError::internal("Failed to generate access token", e))
    }
}

/// Resolve an access token into the calling principal.
pub fn authenticate(jwt: &JwtConfig, access_token: &str) -> Result<Principal, AuthError> {
    match jwt.verify_subject(access_token) {
        Ok(subject) => Ok(Principal::new(subject)),
        Err(e) if e.is_expired() => Err(AuthError::Unauthorized("Access token has expired")),
        Err(_) => Err(AuthError::Unauthorized("Invalid access token")),
    }
}
