//! Application error types
//!
//! Every failure mode surfaces to the caller as a user-displayable reason
//! code ([`ApplicationError::reason_code`]). Errors never drive control
//! flow beyond the immediate operation boundary and nothing is retried
//! automatically; callers may re-invoke.

use thiserror::Error;
use souk_domain::DomainError;

/// Application-level errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// No account matches the supplied credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but has been banned.
    #[error("account suspended")]
    AccountSuspended,

    /// A two-factor or phone verification code did not match.
    #[error("invalid verification code")]
    InvalidCode,

    /// Registration attempted with an email that is already taken.
    #[error("user already exists")]
    UserExists,

    /// The session token expired.
    #[error("session expired")]
    SessionExpired,

    /// The requested entity was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// A storage operation failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// An unexpected failure with no more specific category.
    #[error("{0}")]
    Generic(String),
}

impl ApplicationError {
    /// Stable snake_case identifier for display and localization lookup.
    ///
    /// These keys propagate unchanged from the collaborator through the
    /// managers to the caller.
    #[must_use]
    pub const fn reason_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::AccountSuspended => "account_suspended",
            Self::InvalidCode => "invalid_code",
            Self::UserExists => "user_exists",
            Self::SessionExpired => "session_expired",
            Self::NotFound(_) => "not_found",
            Self::Domain(_) => "invalid_input",
            Self::Storage(_) => "storage_failure",
            Self::Generic(_) => "generic_failure",
        }
    }
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes_are_stable() {
        assert_eq!(
            ApplicationError::InvalidCredentials.reason_code(),
            "invalid_credentials"
        );
        assert_eq!(
            ApplicationError::SessionExpired.reason_code(),
            "session_expired"
        );
        assert_eq!(
            ApplicationError::NotFound("ad".to_string()).reason_code(),
            "not_found"
        );
    }
}
