//! Access token generation and validation.
//!
//! Access tokens are short-lived HS256 JWTs carrying the user id as `sub`.
//! They are never stored: a token is valid iff its signature verifies, its
//! issuer matches [`ISSUER`] and `exp` has not passed.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Issuer written into and required from every access token.
pub const ISSUER: &str = "chirpy";

/// Longest access token lifetime the server will issue: 1 hour.
pub const MAX_ACCESS_TOKEN_DURATION: Duration = Duration::from_secs(60 * 60);

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Issuer
    pub iss: String,
    /// Subject (user UUID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Source of the keys used to sign and verify access tokens.
///
/// Call sites only see this trait, so a keyring with rotation can replace
/// [`StaticSecret`] without touching them.
pub trait SigningKeys: Send + Sync {
    fn encoding_key(&self) -> &EncodingKey;
    fn decoding_key(&self) -> &DecodingKey;
}

/// A single shared HMAC secret.
pub struct StaticSecret {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl StaticSecret {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }
}

impl SigningKeys for StaticSecret {
    fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

/// Result of generating an access token.
#[derive(Debug, Clone)]
pub struct AccessTokenResult {
    /// The JWT token string
    pub token: String,
    /// Token duration in seconds
    pub duration: u64,
    /// Expiration timestamp (Unix seconds)
    pub expires_at: i64,
}

/// Issues and verifies access tokens.
#[derive(Clone)]
pub struct JwtConfig {
    keys: Arc<dyn SigningKeys>,
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret.
    pub fn new(secret: &[u8]) -> Self {
        Self::with_keys(Arc::new(StaticSecret::new(secret)))
    }

    pub fn with_keys(keys: Arc<dyn SigningKeys>) -> Self {
        Self { keys }
    }

    /// Generate an access token for a user.
    ///
    /// `ttl` defaults to [`MAX_ACCESS_TOKEN_DURATION`]; a zero or larger value
    /// is replaced by the maximum.
    pub fn generate_access_token(
        &self,
        user_uuid: &str,
        ttl: Option<Duration>,
    ) -> Result<AccessTokenResult, TokenError> {
        let duration = effective_ttl(ttl).as_secs();
        let now = Utc::now().timestamp();
        let exp = now
            .checked_add(i64::try_from(duration).map_err(|_| TokenError::Time)?)
            .ok_or(TokenError::Time)?;

        let claims = AccessClaims {
            iss: ISSUER.to_string(),
            sub: user_uuid.to_string(),
            iat: now,
            exp,
        };

        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            self.keys.encoding_key(),
        )
        .map_err(|e| TokenError::Encoding(e.to_string()))?;

        Ok(AccessTokenResult {
            token,
            duration,
            expires_at: exp,
        })
    }

    /// Validate an access token and return its claims.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let token_data =
            jsonwebtoken::decode::<AccessClaims>(token, self.keys.decoding_key(), &validation)
                .map_err(TokenError::from)?;

        // jsonwebtoken still accepts `exp == now` with zero leeway.
        if token_data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(token_data.claims)
    }

    /// Validate an access token and return only its subject.
    pub fn verify_subject(&self, token: &str) -> Result<String, TokenError> {
        self.validate_access_token(token).map(|claims| claims.sub)
    }
}

fn effective_ttl(requested: Option<Duration>) -> Duration {
    match requested {
        Some(ttl) if !ttl.is_zero() && ttl <= MAX_ACCESS_TOKEN_DURATION => ttl,
        _ => MAX_ACCESS_TOKEN_DURATION,
    }
}

/// Errors that can occur during access token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token issuer is invalid")]
    InvalidIssuer,
    #[error("token is malformed: {0}")]
    Malformed(String),
    #[error("failed to encode token: {0}")]
    Encoding(String),
    #[error("system time error")]
    Time,
}

impl TokenError {
    pub fn is_expired(&self) -> bool {
        matches!(self, TokenError::Expired)
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
            _ => TokenError::Malformed(e.to_string()),
        }
    }
}
