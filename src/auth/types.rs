//! Authentication identity types.

use crate::db::Chirp;

/// The authenticated caller of a single request, taken from a validated
/// access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// User UUID (the token's `sub` claim)
    pub subject: String,
}

impl Principal {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }
}

/// A resource that belongs to exactly one user.
pub trait OwnedResource {
    fn owner_id(&self) -> &str;
}

impl OwnedResource for Chirp {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}
