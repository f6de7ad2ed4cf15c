//! Ownership checks for mutating operations.

use super::errors::AuthError;
use super::types::{OwnedResource, Principal};

/// Allow iff the principal is the resource owner.
pub fn authorize(principal: &Principal, resource_owner_id: &str) -> Result<(), AuthError> {
    if principal.subject == resource_owner_id {
        Ok(())
    } else {
        Err(AuthError::Forbidden(
            "You do not have permission to modify this resource",
        ))
    }
}

/// [`authorize`] against any resource that knows its owner.
pub fn authorize_owner<R: OwnedResource>(
    principal: &Principal,
    resource: &R,
) -> Result<(), AuthError> {
    authorize(principal, resource.owner_id())
}
