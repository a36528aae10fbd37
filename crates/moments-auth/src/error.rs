//! Authentication errors.

use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A required field is empty or malformed.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The one-time code did not match.
    #[error("invalid one-time code")]
    InvalidOtp,

    /// Verification attempted without a matching code request.
    #[error("no one-time code was requested for {0}")]
    NoPendingOtp(String),

    /// A user is already signed in.
    #[error("already signed in")]
    AlreadyAuthenticated,

    /// The operation needs a signed-in user.
    #[error("not signed in")]
    NotAuthenticated,

    /// The OTP provider failed to deliver or check a code.
    #[error("one-time code delivery failed: {0}")]
    Delivery(String),
}

impl AuthError {
    /// Check if this is an authentication failure rather than bad input.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidOtp | AuthError::NoPendingOtp(_) | AuthError::NotAuthenticated
        )
    }
}
