//! Reporting hook for transfer outcomes.
//!
//! The engine calls the observer after a transfer has either committed or
//! been rejected. Decision logic never logs on its own.

use remesa_shared::types::AccountId;
use tracing::{info, warn};

use super::error::TransferError;
use super::types::TransferReceipt;

/// Receives transfer outcomes.
pub trait TransferObserver: Send + Sync {
    /// Called after a transfer committed.
    fn on_committed(&self, sender_account_id: AccountId, receipt: &TransferReceipt);

    /// Called after a transfer was rejected or failed with no effect.
    fn on_rejected(
        &self,
        sender_account_id: AccountId,
        recipient_account_id: Option<AccountId>,
        error: &TransferError,
    );
}

/// Emits structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TransferObserver for TracingObserver {
    fn on_committed(&self, sender_account_id: AccountId, receipt: &TransferReceipt) {
        info!(
            transaction_id = %receipt.transaction_id,
            sender_account_id = %sender_account_id,
            recipient_account_id = %receipt.recipient_account_id,
            amount = %receipt.amount,
            "Transfer committed"
        );
    }

    fn on_rejected(
        &self,
        sender_account_id: AccountId,
        recipient_account_id: Option<AccountId>,
        error: &TransferError,
    ) {
        let recipient = recipient_account_id.map(i64::from);
        if error.is_retryable() {
            warn!(
                sender_account_id = %sender_account_id,
                recipient_account_id = ?recipient,
                error_code = error.error_code(),
                error = %error,
                "Transfer failed"
            );
        } else {
            info!(
                sender_account_id = %sender_account_id,
                recipient_account_id = ?recipient,
                error_code = error.error_code(),
                error = %error,
                "Transfer rejected"
            );
        }
    }
}

/// Discards every outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl TransferObserver for NoopObserver {
    fn on_committed(&self, _sender_account_id: AccountId, _receipt: &TransferReceipt) {}

    fn on_rejected(
        &self,
        _sender_account_id: AccountId,
        _recipient_account_id: Option<AccountId>,
        _error: &TransferError,
    ) {
    }
}
