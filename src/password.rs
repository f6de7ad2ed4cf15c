//! Password hashing with Argon2id.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$...`), so the algorithm
//! and its parameters travel with the salt. Hashing is deliberately slow; the
//! async helpers move it onto the blocking pool and bound how long a request
//! waits for it.

use std::time::Duration;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use thiserror::Error;

/// Upper bound on how long a request waits for a hash computation.
pub const HASH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum PasswordError {
    /// The hashing engine failed (or did not finish within [`HASH_TIMEOUT`]).
    #[error("password hashing failed: {0}")]
    Hash(String),
    /// The stored hash could not be parsed.
    #[error("stored password hash is malformed: {0}")]
    Malformed(String),
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Check a password against a stored hash.
///
/// Returns `Ok(false)` on a mismatch; `Err` only when the stored hash is
/// corrupt or the engine fails.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::Malformed(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Hash(e.to_string())),
    }
}

/// [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(password: String) -> Result<String, PasswordError> {
    run_blocking(move || hash_password(&password)).await
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(
    password: String,
    hash: String,
) -> Result<bool, PasswordError> {
    run_blocking(move || verify_password(&password, &hash)).await
}

async fn run_blocking<T, F>(f: F) -> Result<T, PasswordError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
{
    match tokio::time::timeout(HASH_TIMEOUT, tokio::task::spawn_blocking(f)).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(PasswordError::Hash(format!("hashing task failed: {}", e))),
        Err(_) => Err(PasswordError::Hash("hashing timed out".into())),
    }
}
