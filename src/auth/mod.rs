//! Authentication and authorization.
//!
//! Dual-token system: short-lived access tokens (1 hour max, stateless JWTs)
//! and long-lived refresh tokens (60 days, opaque and database-tracked).
//! Mutating endpoints resolve the caller into a [`Principal`] and check
//! resource ownership with [`authorize`].

mod bearer;
mod errors;
mod extractors;
mod guard;
mod session;
mod state;
mod types;

pub use bearer::{CredentialHeaderError, get_api_key, get_bearer_token};
pub use errors::AuthError;
pub use extractors::{Auth, BearerRefreshToken};
pub use guard::{authorize, authorize_owner};
pub use session::{
    LoginSession, REFRESH_TOKEN_BYTES, REFRESH_TOKEN_DURATION_DAYS, SessionManager, authenticate,
    generate_refresh_token,
};
pub use state::HasAuthBackend;
pub use types::{OwnedResource, Principal};
