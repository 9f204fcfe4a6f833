//! Transfer engine and the unit-of-work seam it drives.

use std::sync::Arc;

use remesa_shared::types::AccountId;

use super::error::TransferError;
use super::observer::{TracingObserver, TransferObserver};
use super::policy::TransferPolicy;
use super::types::{TransactionRecord, TransferCommand, TransferReceipt, TransferRequest};
use crate::calendar::LedgerCalendar;

/// Persistence seam for transfers.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait TransferStore: Send + Sync {
    /// Applies one transfer as a single indivisible unit of work.
    ///
    /// Implementations must, in one transaction:
    /// 1. lock the sender and recipient account rows in ascending id order,
    ///    failing with `TransferError::Busy` if the locks are not granted in time;
    /// 2. read `calendar.now()` and derive today's date only after the locks are held;
    /// 3. read the sender's sent total and the recipient's received total for today;
    /// 4. call `policy.evaluate` and roll back on rejection;
    /// 5. debit, credit, append the ledger entry and increment both daily totals;
    /// 6. commit, rolling back everything if any step fails.
    fn apply_transfer(
        &self,
        command: &TransferCommand,
        calendar: &LedgerCalendar,
        policy: &TransferPolicy,
    ) -> impl std::future::Future<Output = Result<TransactionRecord, TransferError>> + Send;

    /// Every ledger entry where the account is sender or recipient, newest first.
    fn transactions_for_account(
        &self,
        account_id: AccountId,
    ) -> impl std::future::Future<Output = Result<Vec<TransactionRecord>, TransferError>> + Send;
}

/// Validates and applies transfers.
pub struct TransferEngine<S: TransferStore> {
    store: Arc<S>,
    policy: TransferPolicy,
    calendar: LedgerCalendar,
    observer: Arc<dyn TransferObserver>,
}

impl<S: TransferStore> TransferEngine<S> {
    /// Creates an engine reporting through [`TracingObserver`].
    #[must_use]
    pub fn new(store: Arc<S>, policy: TransferPolicy, calendar: LedgerCalendar) -> Self {
        Self {
            store,
            policy,
            calendar,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replaces the outcome observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn TransferObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Returns the active policy.
    #[must_use]
    pub const fn policy(&self) -> &TransferPolicy {
        &self.policy
    }

    /// Returns the ledger calendar.
    #[must_use]
    pub const fn calendar(&self) -> &LedgerCalendar {
        &self.calendar
    }

    /// Moves funds between two accounts.
    ///
    /// Request shape and amount bounds are checked before the store is
    /// touched; the remaining checks run inside the store's unit of work.
    ///
    /// # Errors
    ///
    /// Returns the first violated precondition, `TransferError::Busy` on lock
    /// timeout, or `TransferError::Storage`. In every error case no balance,
    /// daily total or ledger entry has changed.
    pub async fn transfer(&self, request: TransferRequest) -> Result<TransferReceipt, TransferError> {
        let sender_account_id = request.sender_account_id;
        let recipient_account_id = request.recipient_account_id;

        match self.execute(request).await {
            Ok(receipt) => {
                self.observer.on_committed(sender_account_id, &receipt);
                Ok(receipt)
            }
            Err(e) => {
                self.observer
                    .on_rejected(sender_account_id, recipient_account_id, &e);
                Err(e)
            }
        }
    }

    async fn execute(&self, request: TransferRequest) -> Result<TransferReceipt, TransferError> {
        let command = request.parse(&self.policy)?;

        let record = self
            .store
            .apply_transfer(&command, &self.calendar, &self.policy)
            .await?;

        Ok(TransferReceipt::from(&record))
    }

    /// Ledger history for an account, newest first, with timestamps in the
    /// reference timezone. Unknown accounts yield an empty history.
    ///
    /// # Errors
    ///
    /// Returns `TransferError::Storage` if the store is unavailable.
    pub async fn transactions_by_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<TransactionRecord>, TransferError> {
        let mut records = self.store.transactions_for_account(account_id).await?;
        for record in &mut records {
            record.timestamp = self.calendar.localize(record.timestamp.to_utc());
        }
        Ok(records)
    }
}
