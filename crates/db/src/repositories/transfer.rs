//! Transfer unit of work against PostgreSQL.
//!
//! One database transaction per transfer:
//!
//! 1. `SET LOCAL lock_timeout` bounds every lock wait.
//! 2. Both account rows are locked `FOR UPDATE` in ascending id order, so two
//!    opposing transfers between the same pair cannot deadlock.
//! 3. The clock is read after the locks are granted; the local day keys the
//!    daily totals.
//! 4. The totals are read `FOR UPDATE`. Rows for a day are only ever written
//!    while the owning account is locked, so a missing row cannot be created
//!    concurrently.
//! 5. The policy decides; a rejection rolls back.
//! 6. Balances, the ledger row and both totals are written, then committed.

use chrono::NaiveDate;
use remesa_core::LedgerCalendar;
use remesa_core::transfer::{
    AccountState, TransactionRecord, TransferCommand, TransferError, TransferPolicy,
    TransferSnapshot, TransferStore,
};
use remesa_shared::types::{AccountId, Money};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbBackend, DbErr, EntityTrait, QueryFilter, QuerySelect, Statement,
    TransactionTrait,
};

use super::error::transfer_error;
use super::transaction::{TransactionRepository, to_record};
use crate::entities::{
    accounts, daily_received_totals, daily_sent_totals, sea_orm_active_enums::TransferStatus,
    transactions,
};

const UPSERT_SENT_SQL: &str = r"
INSERT INTO daily_sent_totals (account_id, day, amount, updated_at)
VALUES ($1, $2, $3, now())
ON CONFLICT (account_id, day)
DO UPDATE SET amount = daily_sent_totals.amount + EXCLUDED.amount, updated_at = now()
";

const UPSERT_RECEIVED_SQL: &str = r"
INSERT INTO daily_received_totals (account_id, day, amount, updated_at)
VALUES ($1, $2, $3, now())
ON CONFLICT (account_id, day)
DO UPDATE SET amount = daily_received_totals.amount + EXCLUDED.amount, updated_at = now()
";

/// PostgreSQL implementation of [`TransferStore`].
#[derive(Debug, Clone)]
pub struct TransferRepository {
    db: DatabaseConnection,
    lock_timeout_ms: u64,
}

impl TransferRepository {
    /// Creates a transfer repository whose lock waits give up after
    /// `lock_timeout_ms` with `TransferError::Busy`.
    #[must_use]
    pub const fn new(db: DatabaseConnection, lock_timeout_ms: u64) -> Self {
        Self { db, lock_timeout_ms }
    }

    /// Today's sent total for an account, zero when nothing was sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn sent_on(&self, account_id: AccountId, day: NaiveDate) -> Result<Money, DbErr> {
        let row = daily_sent_totals::Entity::find()
            .filter(daily_sent_totals::Column::AccountId.eq(account_id.into_inner()))
            .filter(daily_sent_totals::Column::Day.eq(day))
            .one(&self.db)
            .await?;
        Ok(row.map_or(Money::ZERO, |r| Money::new(r.amount)))
    }

    /// Today's received total for an account, zero when nothing was received.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn received_on(
        &self,
        account_id: AccountId,
        day: NaiveDate,
    ) -> Result<Money, DbErr> {
        let row = daily_received_totals::Entity::find()
            .filter(daily_received_totals::Column::AccountId.eq(account_id.into_inner()))
            .filter(daily_received_totals::Column::Day.eq(day))
            .one(&self.db)
            .await?;
        Ok(row.map_or(Money::ZERO, |r| Money::new(r.amount)))
    }

    async fn apply(
        &self,
        txn: &DatabaseTransaction,
        command: &TransferCommand,
        calendar: &LedgerCalendar,
        policy: &TransferPolicy,
    ) -> Result<TransactionRecord, TransferError> {
        txn.execute_unprepared(&format!(
            "SET LOCAL lock_timeout = '{}ms'",
            self.lock_timeout_ms
        ))
        .await
        .map_err(transfer_error)?;

        let (sender, recipient) =
            lock_pair(txn, command.sender_account_id, command.recipient_account_id)
                .await
                .map_err(transfer_error)?;

        let now = calendar.now();
        let today = now.date_naive();

        let sent_today = match sender {
            Some(_) => locked_sent_total(txn, command.sender_account_id, today)
                .await
                .map_err(transfer_error)?,
            None => Money::ZERO,
        };
        let received_today = match recipient {
            Some(_) => locked_received_total(txn, command.recipient_account_id, today)
                .await
                .map_err(transfer_error)?,
            None => Money::ZERO,
        };

        let snapshot = TransferSnapshot {
            sender,
            recipient,
            sent_today,
            received_today,
        };
        policy.evaluate(command, &snapshot)?;

        let amount = command.amount.amount();
        let debit = Expr::col(accounts::Column::Balance).sub(amount);
        let credit = Expr::col(accounts::Column::Balance).add(amount);
        adjust_balance(txn, command.sender_account_id, debit)
            .await
            .map_err(transfer_error)?;
        adjust_balance(txn, command.recipient_account_id, credit)
            .await
            .map_err(transfer_error)?;

        let model = transactions::ActiveModel {
            sender_account_id: Set(command.sender_account_id.into_inner()),
            receiver_account_id: Set(command.recipient_account_id.into_inner()),
            amount: Set(amount),
            concept: Set(command.concept.clone()),
            status: Set(TransferStatus::Completed),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(txn)
        .await
        .map_err(transfer_error)?;

        upsert_total(txn, UPSERT_SENT_SQL, command.sender_account_id, today, amount)
            .await
            .map_err(transfer_error)?;
        upsert_total(txn, UPSERT_RECEIVED_SQL, command.recipient_account_id, today, amount)
            .await
            .map_err(transfer_error)?;

        let mut record = to_record(model);
        record.timestamp = now;
        Ok(record)
    }
}

impl TransferStore for TransferRepository {
    async fn apply_transfer(
        &self,
        command: &TransferCommand,
        calendar: &LedgerCalendar,
        policy: &TransferPolicy,
    ) -> Result<TransactionRecord, TransferError> {
        let txn = self.db.begin().await.map_err(transfer_error)?;

        match self.apply(&txn, command, calendar, policy).await {
            Ok(record) => {
                txn.commit().await.map_err(transfer_error)?;
                Ok(record)
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    tracing::warn!(error = %rollback, "transfer rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn transactions_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<TransactionRecord>, TransferError> {
        TransactionRepository::new(self.db.clone())
            .list_for_account(account_id)
            .await
            .map_err(transfer_error)
    }
}

/// Locks both accounts in ascending id order and returns them as
/// `(sender, recipient)`.
async fn lock_pair(
    txn: &DatabaseTransaction,
    sender_id: AccountId,
    recipient_id: AccountId,
) -> Result<(Option<AccountState>, Option<AccountState>), DbErr> {
    if sender_id == recipient_id {
        let account = lock_account(txn, sender_id).await?;
        return Ok((account, account));
    }

    let (first, second) = if sender_id < recipient_id {
        (sender_id, recipient_id)
    } else {
        (recipient_id, sender_id)
    };
    let first_state = lock_account(txn, first).await?;
    let second_state = lock_account(txn, second).await?;

    if first == sender_id {
        Ok((first_state, second_state))
    } else {
        Ok((second_state, first_state))
    }
}

async fn lock_account(
    txn: &DatabaseTransaction,
    account_id: AccountId,
) -> Result<Option<AccountState>, DbErr> {
    let model = accounts::Entity::find_by_id(account_id.into_inner())
        .lock_exclusive()
        .one(txn)
        .await?;

    Ok(model.map(|m| AccountState {
        id: AccountId::new(m.id),
        balance: Money::new(m.balance),
        active: m.active,
    }))
}

async fn locked_sent_total(
    txn: &DatabaseTransaction,
    account_id: AccountId,
    day: NaiveDate,
) -> Result<Money, DbErr> {
    let row = daily_sent_totals::Entity::find()
        .filter(daily_sent_totals::Column::AccountId.eq(account_id.into_inner()))
        .filter(daily_sent_totals::Column::Day.eq(day))
        .lock_exclusive()
        .one(txn)
        .await?;
    Ok(row.map_or(Money::ZERO, |r| Money::new(r.amount)))
}

async fn locked_received_total(
    txn: &DatabaseTransaction,
    account_id: AccountId,
    day: NaiveDate,
) -> Result<Money, DbErr> {
    let row = daily_received_totals::Entity::find()
        .filter(daily_received_totals::Column::AccountId.eq(account_id.into_inner()))
        .filter(daily_received_totals::Column::Day.eq(day))
        .lock_exclusive()
        .one(txn)
        .await?;
    Ok(row.map_or(Money::ZERO, |r| Money::new(r.amount)))
}

async fn adjust_balance(
    txn: &DatabaseTransaction,
    account_id: AccountId,
    balance: SimpleExpr,
) -> Result<(), DbErr> {
    let result = accounts::Entity::update_many()
        .col_expr(accounts::Column::Balance, balance)
        .col_expr(accounts::Column::UpdatedAt, Expr::current_timestamp().into())
        .filter(accounts::Column::Id.eq(account_id.into_inner()))
        .exec(txn)
        .await?;

    if result.rows_affected == 1 {
        Ok(())
    } else {
        Err(DbErr::RecordNotUpdated)
    }
}

async fn upsert_total(
    txn: &DatabaseTransaction,
    sql: &str,
    account_id: AccountId,
    day: NaiveDate,
    amount: Decimal,
) -> Result<(), DbErr> {
    txn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        sql,
        [account_id.into_inner().into(), day.into(), amount.into()],
    ))
    .await?;
    Ok(())
}
