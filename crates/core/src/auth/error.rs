//! Authentication error types.

use remesa_shared::AppError;
use remesa_shared::types::UserId;
use thiserror::Error;

use super::password::PasswordError;

/// Errors raised by login and user administration.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The user is blocked.
    #[error("user {0} is blocked")]
    Blocked(UserId),

    /// The user does not exist.
    #[error("user {0} not found")]
    UserNotFound(UserId),

    /// The email is already registered.
    #[error("email '{0}' is already registered")]
    EmailTaken(String),

    /// Malformed registration input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Password hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Credential issuance failed.
    #[error("failed to issue credential: {0}")]
    Credential(String),

    /// Lock contention on the user row.
    #[error("user store busy: {0}")]
    Busy(String),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Returns the stable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "UNAUTHORIZED",
            Self::Blocked(_) => "BLOCKED",
            Self::UserNotFound(_) => "NOT_FOUND",
            Self::EmailTaken(_) => "ALREADY_EXISTS",
            Self::InvalidInput(_) => "INVALID_REQUEST",
            Self::Password(_) | Self::Credential(_) => "INTERNAL_ERROR",
            Self::Busy(_) => "BUSY",
            Self::Repository(_) => "STORAGE_FAILURE",
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized(message),
            AuthError::Blocked(_) => Self::Blocked(message),
            AuthError::UserNotFound(_) => Self::NotFound(message),
            AuthError::EmailTaken(_) => Self::AlreadyExists(message),
            AuthError::InvalidInput(_) => Self::InvalidRequest(message),
            AuthError::Password(_) | AuthError::Credential(_) => Self::Internal(message),
            AuthError::Busy(_) => Self::Busy(message),
            AuthError::Repository(_) => Self::StorageFailure(message),
        }
    }
}
