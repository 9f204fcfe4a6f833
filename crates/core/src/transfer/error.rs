//! Transfer rejection and failure types.

use remesa_shared::AppError;
use remesa_shared::types::{AccountId, Money};
use thiserror::Error;

/// Errors that can occur while validating or applying a transfer.
///
/// Every variant except `Busy` and `Storage` is detected before any write.
/// `Busy` and `Storage` are raised with the unit of work rolled back.
#[derive(Debug, Error)]
pub enum TransferError {
    // ========== Request Errors ==========
    /// No recipient account given.
    #[error("recipient account is required")]
    MissingRecipient,

    /// Amount missing, not a finite number, or finer than one cent.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Sender and recipient are the same account.
    #[error("cannot transfer from account {0} to itself")]
    SelfTransfer(AccountId),

    // ========== Account Errors ==========
    /// Sender account does not exist.
    #[error("sender account {0} not found")]
    SenderNotFound(AccountId),

    /// Recipient account does not exist or is inactive.
    #[error("recipient account {0} not found")]
    RecipientNotFound(AccountId),

    /// Sender balance does not cover the amount.
    #[error("insufficient funds: balance {balance}, requested {amount}")]
    InsufficientFunds {
        /// Sender balance.
        balance: Money,
        /// Requested amount.
        amount: Money,
    },

    // ========== Limit Errors ==========
    /// Amount outside the single-transfer bounds.
    #[error("amount {amount} outside allowed range [{min}, {max}]")]
    AmountOutOfRange {
        /// Requested amount.
        amount: Money,
        /// Inclusive lower bound.
        min: Money,
        /// Inclusive upper bound.
        max: Money,
    },

    /// Sender would exceed its daily sent total.
    #[error("daily send limit exceeded: sent {sent_today} today, requested {amount}, cap {cap}")]
    DailySentCapExceeded {
        /// Already sent today.
        sent_today: Money,
        /// Requested amount.
        amount: Money,
        /// Daily cap.
        cap: Money,
    },

    /// Recipient would exceed its daily received total.
    #[error(
        "daily receive limit exceeded: received {received_today} today, requested {amount}, cap {cap}"
    )]
    DailyReceivedCapExceeded {
        /// Already received today.
        received_today: Money,
        /// Requested amount.
        amount: Money,
        /// Daily cap.
        cap: Money,
    },

    /// Recipient balance would exceed the ceiling.
    #[error("recipient balance cap exceeded: balance {balance}, requested {amount}, cap {cap}")]
    BalanceCapExceeded {
        /// Recipient balance.
        balance: Money,
        /// Requested amount.
        amount: Money,
        /// Balance ceiling.
        cap: Money,
    },

    // ========== Storage Errors ==========
    /// Locks could not be acquired in time.
    #[error("ledger busy: {0}")]
    Busy(String),

    /// Store unavailable or commit failed.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl TransferError {
    /// Returns the stable rejection code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingRecipient | Self::InvalidAmount(_) | Self::SelfTransfer(_) => {
                "INVALID_REQUEST"
            }
            Self::SenderNotFound(_) | Self::RecipientNotFound(_) => "NOT_FOUND",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::AmountOutOfRange { .. }
            | Self::DailySentCapExceeded { .. }
            | Self::DailyReceivedCapExceeded { .. } => "LIMIT_EXCEEDED",
            Self::BalanceCapExceeded { .. } => "BALANCE_CAP_EXCEEDED",
            Self::Busy(_) => "BUSY",
            Self::Storage(_) => "STORAGE_FAILURE",
        }
    }

    /// Returns true if the transfer left no effect and may be resubmitted.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy(_) | Self::Storage(_))
    }
}

impl From<TransferError> for AppError {
    fn from(err: TransferError) -> Self {
        let message = err.to_string();
        match err {
            TransferError::MissingRecipient
            | TransferError::InvalidAmount(_)
            | TransferError::SelfTransfer(_) => Self::InvalidRequest(message),
            TransferError::SenderNotFound(_) | TransferError::RecipientNotFound(_) => {
                Self::NotFound(message)
            }
            TransferError::InsufficientFunds { .. } => Self::InsufficientFunds(message),
            TransferError::AmountOutOfRange { .. }
            | TransferError::DailySentCapExceeded { .. }
            | TransferError::DailyReceivedCapExceeded { .. } => Self::LimitExceeded(message),
            TransferError::BalanceCapExceeded { .. } => Self::BalanceCapExceeded(message),
            TransferError::Busy(_) => Self::Busy(message),
            TransferError::Storage(_) => Self::StorageFailure(message),
        }
    }
}
