//! Read access to the append-only transactions ledger.

use remesa_core::transfer::{TransactionRecord, TransactionStatus};
use remesa_shared::types::{AccountId, Money, TransactionId};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
};

use crate::entities::transactions;

/// Transaction repository. There is no update or delete path.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a ledger entry by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: TransactionId) -> Result<Option<TransactionRecord>, DbErr> {
        let model = transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?;
        Ok(model.map(to_record))
    }

    /// Every entry where the account is sender or receiver, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<TransactionRecord>, DbErr> {
        let id = account_id.into_inner();
        let models = transactions::Entity::find()
            .filter(
                Condition::any()
                    .add(transactions::Column::SenderAccountId.eq(id))
                    .add(transactions::Column::ReceiverAccountId.eq(id)),
            )
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(to_record).collect())
    }
}

pub(crate) fn to_record(model: transactions::Model) -> TransactionRecord {
    TransactionRecord {
        id: TransactionId::new(model.id),
        sender_account_id: AccountId::new(model.sender_account_id),
        recipient_account_id: AccountId::new(model.receiver_account_id),
        amount: Money::new(model.amount),
        concept: model.concept,
        status: TransactionStatus::from(model.status),
        timestamp: model.created_at,
    }
}
