//! Classification of database errors into domain failures.

use remesa_core::account::AccountError;
use remesa_core::auth::AuthError;
use remesa_core::transfer::TransferError;
use sea_orm::{ConnAcquireErr, DbErr, RuntimeErr, SqlErr};

/// `lock_not_available`, raised when `lock_timeout` expires.
const LOCK_NOT_AVAILABLE: &str = "55P03";
/// `deadlock_detected`.
const DEADLOCK_DETECTED: &str = "40P01";
/// `serialization_failure`.
const SERIALIZATION_FAILURE: &str = "40001";

/// What a database error means to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreFailure {
    /// Lock contention or pool exhaustion. Safe to retry.
    Busy(String),
    /// A unique constraint rejected the write.
    UniqueViolation(String),
    /// A foreign key rejected the write.
    ForeignKeyViolation(String),
    /// Anything else.
    Other(String),
}

pub(crate) fn classify(err: &DbErr) -> StoreFailure {
    let message = err.to_string();

    if is_pool_timeout(err) {
        return StoreFailure::Busy(message);
    }
    if let Some(code) = sqlstate(err)
        && matches!(
            code.as_str(),
            LOCK_NOT_AVAILABLE | DEADLOCK_DETECTED | SERIALIZATION_FAILURE
        )
    {
        return StoreFailure::Busy(message);
    }

    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => StoreFailure::UniqueViolation(message),
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            StoreFailure::ForeignKeyViolation(message)
        }
        _ => StoreFailure::Other(message),
    }
}

fn sqlstate(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(e)))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(e)))
        | DbErr::Conn(RuntimeErr::SqlxError(sqlx::Error::Database(e))) => {
            e.code().map(std::borrow::Cow::into_owned)
        }
        _ => None,
    }
}

fn is_pool_timeout(err: &DbErr) -> bool {
    matches!(
        err,
        DbErr::ConnectionAcquire(ConnAcquireErr::Timeout)
            | DbErr::Conn(RuntimeErr::SqlxError(sqlx::Error::PoolTimedOut))
            | DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::PoolTimedOut))
            | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::PoolTimedOut))
    )
}

/// Maps a database error raised inside a transfer.
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn transfer_error(err: DbErr) -> TransferError {
    match classify(&err) {
        StoreFailure::Busy(message) => TransferError::Busy(message),
        StoreFailure::UniqueViolation(message)
        | StoreFailure::ForeignKeyViolation(message)
        | StoreFailure::Other(message) => {
            tracing::error!(error = %message, "transfer storage failure");
            TransferError::Storage(message)
        }
    }
}

/// Maps a database error raised by an account operation.
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn account_error(err: DbErr) -> AccountError {
    match classify(&err) {
        StoreFailure::Busy(message) => AccountError::Busy(message),
        StoreFailure::UniqueViolation(message)
        | StoreFailure::ForeignKeyViolation(message)
        | StoreFailure::Other(message) => AccountError::Repository(message),
    }
}

/// Maps a database error raised by a user operation.
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn auth_error(err: DbErr) -> AuthError {
    match classify(&err) {
        StoreFailure::Busy(message) => AuthError::Busy(message),
        StoreFailure::UniqueViolation(message)
        | StoreFailure::ForeignKeyViolation(message)
        | StoreFailure::Other(message) => AuthError::Repository(message),
    }
}
