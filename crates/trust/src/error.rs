//! Trust engine errors

use rentverse_core::Role;
use rentverse_persistence::PersistenceError;
use thiserror::Error;

/// Errors from the trust engine.
///
/// A missing profile is a hard failure (the caller violated a
/// precondition); an unknown or inactive rule is NOT an error - it is a
/// successful no-op surfaced as [`crate::TrustOutcome::Skipped`].
#[derive(Debug, Error)]
pub enum TrustError {
    #[error("Trust profile not found: user {user_id} as {role}")]
    ProfileNotFound { user_id: String, role: Role },

    #[error("Invalid rating: {0} (expected 1-5)")]
    InvalidRating(u8),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Result type alias for TrustError
pub type TrustResult<T> = Result<T, TrustError>;

impl TrustError {
    pub fn profile_not_found(user_id: &str, role: Role) -> Self {
        Self::ProfileNotFound {
            user_id: user_id.to_string(),
            role,
        }
    }

    pub fn is_profile_not_found(&self) -> bool {
        matches!(self, Self::ProfileNotFound { .. })
    }
}
