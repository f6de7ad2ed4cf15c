//! Credential extraction from the `Authorization` header.
//!
//! Two schemes share the header: `Bearer <token>` for access and refresh
//! tokens, and `ApiKey <key>` for the payment provider's webhook. Scheme
//! keywords are matched case-sensitively.

use axum::http::{HeaderMap, header};
use thiserror::Error;

const BEARER_SCHEME: &str = "Bearer ";
const API_KEY_SCHEME: &str = "ApiKey ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialHeaderError {
    #[error("authorization header is missing")]
    Missing,
    #[error("authorization header is malformed")]
    Malformed,
}

/// Extract the token from `Authorization: Bearer <token>`.
pub fn get_bearer_token(headers: &HeaderMap) -> Result<&str, CredentialHeaderError> {
    get_credential(headers, BEARER_SCHEME)
}

/// Extract the key from `Authorization: ApiKey <key>`.
pub fn get_api_key(headers: &HeaderMap) -> Result<&str, CredentialHeaderError> {
    get_credential(headers, API_KEY_SCHEME)
}

fn get_credential<'a>(
    headers: &'a HeaderMap,
    scheme: &str,
) -> Result<&'a str, CredentialHeaderError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(CredentialHeaderError::Missing)?
        .to_str()
        .map_err(|_| CredentialHeaderError::Malformed)?;

    let credential = value
        .strip_prefix(scheme)
        .ok_or(CredentialHeaderError::Malformed)?
        .trim();

    if credential.is_empty() {
        return Err(CredentialHeaderError::Malformed);
    }

    Ok(credential)
}
