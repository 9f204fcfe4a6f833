//! Account repository for database operations.
//!
//! Implements account lifecycle persistence using SeaORM.

use remesa_core::account::{Account, AccountError, AccountRepository as AccountRepoTrait};
use remesa_core::transfer::TransactionRecord;
use remesa_shared::types::{AccountId, Money, UserId};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter,
};

use super::error::{StoreFailure, account_error, classify};
use super::transaction::TransactionRepository;
use crate::entities::accounts;

/// Account repository implementation.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl AccountRepoTrait for AccountRepository {
    async fn create(&self, user_id: UserId) -> Result<Account, AccountError> {
        let model = accounts::ActiveModel {
            user_id: Set(user_id.into_inner()),
            balance: Set(Decimal::ZERO),
            active: Set(true),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| match classify(&e) {
            StoreFailure::UniqueViolation(_) => AccountError::AlreadyExists(user_id),
            StoreFailure::ForeignKeyViolation(_) => AccountError::UserNotFound(user_id),
            _ => account_error(e),
        })?;

        Ok(to_domain(model))
    }

    async fn set_active(
        &self,
        account_id: AccountId,
        active: bool,
    ) -> Result<Option<Account>, AccountError> {
        let result = accounts::Entity::update_many()
            .col_expr(accounts::Column::Active, Expr::value(active))
            .col_expr(accounts::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(accounts::Column::Id.eq(account_id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(account_error)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(account_id).await
    }

    async fn find_by_id(&self, account_id: AccountId) -> Result<Option<Account>, AccountError> {
        let model = accounts::Entity::find_by_id(account_id.into_inner())
            .one(&self.db)
            .await
            .map_err(account_error)?;

        Ok(model.map(to_domain))
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Account>, AccountError> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(account_error)?;

        Ok(model.map(to_domain))
    }

    async fn transactions_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<TransactionRecord>, AccountError> {
        TransactionRepository::new(self.db.clone())
            .list_for_account(account_id)
            .await
            .map_err(account_error)
    }
}

fn to_domain(model: accounts::Model) -> Account {
    Account {
        id: AccountId::new(model.id),
        user_id: UserId::new(model.user_id),
        balance: Money::new(model.balance),
        active: model.active,
        created_at: model.created_at.to_utc(),
    }
}
