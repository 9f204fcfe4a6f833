//! Application-wide error types.
//!
//! Domain modules keep their own error enums. `AppError` is the stable
//! taxonomy a caller maps to responses; every domain error converts into it.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input, or a self-transfer.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown entity, or a recipient that cannot receive funds.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Sender balance does not cover the amount.
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Single-transfer or daily cumulative limit violated.
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    /// Recipient balance ceiling would be crossed.
    #[error("Balance cap exceeded: {0}")]
    BalanceCapExceeded(String),

    /// Duplicate entry (account per user, user email).
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// The user is locked out.
    #[error("Blocked: {0}")]
    Blocked(String),

    /// Lock contention or timeout. Safe to retry.
    #[error("Busy: {0}")]
    Busy(String),

    /// Durable store unavailable or commit failure.
    #[error("Storage failure: {0}")]
    StorageFailure(String),

    /// Internal error (configuration, credential encoding).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Blocked(_) => 403,
            Self::NotFound(_) => 404,
            Self::AlreadyExists(_) => 409,
            Self::InsufficientFunds(_) | Self::LimitExceeded(_) | Self::BalanceCapExceeded(_) => {
                422
            }
            Self::Busy(_) => 503,
            Self::StorageFailure(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InsufficientFunds(_) => "INSUFFICIENT_FUNDS",
            Self::LimitExceeded(_) => "LIMIT_EXCEEDED",
            Self::BalanceCapExceeded(_) => "BALANCE_CAP_EXCEEDED",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Blocked(_) => "BLOCKED",
            Self::Busy(_) => "BUSY",
            Self::StorageFailure(_) => "STORAGE_FAILURE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the operation left no effect and may be retried as is.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy(_) | Self::StorageFailure(_))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::InvalidRequest(String::new()), 400, "INVALID_REQUEST")]
    #[case(AppError::NotFound(String::new()), 404, "NOT_FOUND")]
    #[case(AppError::InsufficientFunds(String::new()), 422, "INSUFFICIENT_FUNDS")]
    #[case(AppError::LimitExceeded(String::new()), 422, "LIMIT_EXCEEDED")]
    #[case(AppError::BalanceCapExceeded(String::new()), 422, "BALANCE_CAP_EXCEEDED")]
    #[case(AppError::AlreadyExists(String::new()), 409, "ALREADY_EXISTS")]
    #[case(AppError::Unauthorized(String::new()), 401, "UNAUTHORIZED")]
    #[case(AppError::Blocked(String::new()), 403, "BLOCKED")]
    #[case(AppError::Busy(String::new()), 503, "BUSY")]
    #[case(AppError::StorageFailure(String::new()), 500, "STORAGE_FAILURE")]
    #[case(AppError::Internal(String::new()), 500, "INTERNAL_ERROR")]
    fn test_error_mapping(#[case] err: AppError, #[case] status: u16, #[case] code: &str) {
        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_only_busy_and_storage_failures_are_retryable() {
        assert!(AppError::Busy(String::new()).is_retryable());
        assert!(AppError::StorageFailure(String::new()).is_retryable());
        assert!(!AppError::LimitExceeded(String::new()).is_retryable());
        assert!(!AppError::Blocked(String::new()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::InsufficientFunds("balance 400".into()).to_string(),
            "Insufficient funds: balance 400"
        );
        assert_eq!(AppError::Busy("lock".into()).to_string(), "Busy: lock");
    }
}
