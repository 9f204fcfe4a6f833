//! Account lifecycle error types.

use remesa_shared::AppError;
use remesa_shared::types::{AccountId, UserId};
use thiserror::Error;

/// Account operation errors.
#[derive(Debug, Error)]
pub enum AccountError {
    /// The user already owns an account.
    #[error("user {0} already has an account")]
    AlreadyExists(UserId),

    /// The user does not exist.
    #[error("user {0} not found")]
    UserNotFound(UserId),

    /// The account does not exist.
    #[error("account {0} not found")]
    NotFound(AccountId),

    /// The user exists but has no account.
    #[error("user {0} has no account")]
    NoAccountForUser(UserId),

    /// Lock contention or pool exhaustion.
    #[error("account store busy: {0}")]
    Busy(String),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl AccountError {
    /// Returns the stable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::UserNotFound(_) | Self::NotFound(_) | Self::NoAccountForUser(_) => "NOT_FOUND",
            Self::Busy(_) => "BUSY",
            Self::Repository(_) => "STORAGE_FAILURE",
        }
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        let message = err.to_string();
        match err {
            AccountError::AlreadyExists(_) => Self::AlreadyExists(message),
            AccountError::UserNotFound(_)
            | AccountError::NotFound(_)
            | AccountError::NoAccountForUser(_) => Self::NotFound(message),
            AccountError::Busy(_) => Self::Busy(message),
            AccountError::Repository(_) => Self::StorageFailure(message),
        }
    }
}
