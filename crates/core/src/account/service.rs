//! Account lifecycle service.

use std::sync::Arc;

use remesa_shared::types::{AccountId, Money, UserId};

use super::error::AccountError;
use super::types::Account;
use crate::transfer::TransactionRecord;

/// Repository trait for account persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait AccountRepository: Send + Sync {
    /// Inserts an account with zero balance, active.
    ///
    /// Must fail with `AccountError::AlreadyExists` when the user already owns
    /// an account and `AccountError::UserNotFound` when the user is unknown.
    fn create(
        &self,
        user_id: UserId,
    ) -> impl std::future::Future<Output = Result<Account, AccountError>> + Send;

    /// Sets the active flag, returning `None` if the account does not exist.
    fn set_active(
        &self,
        account_id: AccountId,
        active: bool,
    ) -> impl std::future::Future<Output = Result<Option<Account>, AccountError>> + Send;

    /// Find account by ID.
    fn find_by_id(
        &self,
        account_id: AccountId,
    ) -> impl std::future::Future<Output = Result<Option<Account>, AccountError>> + Send;

    /// Find the account owned by a user.
    fn find_by_user(
        &self,
        user_id: UserId,
    ) -> impl std::future::Future<Output = Result<Option<Account>, AccountError>> + Send;

    /// Ledger entries touching the account, newest first.
    fn transactions_for_account(
        &self,
        account_id: AccountId,
    ) -> impl std::future::Future<Output = Result<Vec<TransactionRecord>, AccountError>> + Send;
}

/// Account lifecycle operations.
pub struct AccountService<R: AccountRepository> {
    repo: Arc<R>,
}

impl<R: AccountRepository> AccountService<R> {
    /// Create a new account service.
    #[must_use]
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Opens the single account a user may own.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::AlreadyExists` if the user already has an
    /// account, `AccountError::UserNotFound` if the user is unknown.
    pub async fn create_account(&self, user_id: UserId) -> Result<Account, AccountError> {
        if self.repo.find_by_user(user_id).await?.is_some() {
            return Err(AccountError::AlreadyExists(user_id));
        }
        // The unique index on user_id settles concurrent creates.
        self.repo.create(user_id).await
    }

    /// Sets the active flag. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFound` if the account does not exist.
    pub async fn set_active(
        &self,
        account_id: AccountId,
        active: bool,
    ) -> Result<Account, AccountError> {
        self.repo
            .set_active(account_id, active)
            .await?
            .ok_or(AccountError::NotFound(account_id))
    }

    /// Re-enables an account as a transfer recipient.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFound` if the account does not exist.
    pub async fn activate(&self, account_id: AccountId) -> Result<Account, AccountError> {
        self.set_active(account_id, true).await
    }

    /// Stops an account from receiving transfers.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFound` if the account does not exist.
    pub async fn deactivate(&self, account_id: AccountId) -> Result<Account, AccountError> {
        self.set_active(account_id, false).await
    }

    /// Fetches an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFound` if the account does not exist.
    pub async fn find(&self, account_id: AccountId) -> Result<Account, AccountError> {
        self.repo
            .find_by_id(account_id)
            .await?
            .ok_or(AccountError::NotFound(account_id))
    }

    /// Fetches the account owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NoAccountForUser` if the user has none.
    pub async fn account_for_user(&self, user_id: UserId) -> Result<Account, AccountError> {
        self.repo
            .find_by_user(user_id)
            .await?
            .ok_or(AccountError::NoAccountForUser(user_id))
    }

    /// Current balance of the user's account.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NoAccountForUser` if the user has none.
    pub async fn balance_for_user(&self, user_id: UserId) -> Result<Money, AccountError> {
        Ok(self.account_for_user(user_id).await?.balance)
    }

    /// Ledger history of the user's account, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NoAccountForUser` if the user has none.
    pub async fn history_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<TransactionRecord>, AccountError> {
        let account = self.account_for_user(user_id).await?;
        self.repo.transactions_for_account(account.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::TransactionStatus;
    use chrono::{DateTime, Utc};
    use remesa_shared::types::TransactionId;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// Mock repository for testing.
    struct MockAccountRepository {
        users: HashSet<UserId>,
        accounts: Mutex<HashMap<AccountId, Account>>,
        transactions: Vec<TransactionRecord>,
    }

    impl MockAccountRepository {
        fn with_users(ids: &[i64]) -> Self {
            Self {
                users: ids.iter().copied().map(UserId::new).collect(),
                accounts: Mutex::new(HashMap::new()),
                transactions: Vec::new(),
            }
        }
    }

    impl AccountRepository for MockAccountRepository {
        async fn create(&self, user_id: UserId) -> Result<Account, AccountError> {
            if !self.users.contains(&user_id) {
                return Err(AccountError::UserNotFound(user_id));
            }
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.values().any(|a| a.user_id == user_id) {
                return Err(AccountError::AlreadyExists(user_id));
            }
            let id = AccountId::new(i64::try_from(accounts.len()).unwrap() + 1);
            let account = Account {
                id,
                user_id,
                balance: Money::ZERO,
                active: true,
                created_at: Utc::now(),
            };
            accounts.insert(id, account.clone());
            Ok(account)
        }

        async fn set_active(
            &self,
            account_id: AccountId,
            active: bool,
        ) -> Result<Option<Account>, AccountError> {
            let mut accounts = self.accounts.lock().unwrap();
            Ok(accounts.get_mut(&account_id).map(|a| {
                a.active = active;
                a.clone()
            }))
        }

        async fn find_by_id(&self, account_id: AccountId) -> Result<Option<Account>, AccountError> {
            Ok(self.accounts.lock().unwrap().get(&account_id).cloned())
        }

        async fn find_by_user(&self, user_id: UserId) -> Result<Option<Account>, AccountError> {
            Ok(self
                .accounts
                .lock()
                .unwrap()
                .values()
                .find(|a| a.user_id == user_id)
                .cloned())
        }

        async fn transactions_for_account(
            &self,
            account_id: AccountId,
        ) -> Result<Vec<TransactionRecord>, AccountError> {
            Ok(self
                .transactions
                .iter()
                .filter(|t| t.sender_account_id == account_id || t.recipient_account_id == account_id)
                .cloned()
                .collect())
        }
    }

    fn service(repo: MockAccountRepository) -> AccountService<MockAccountRepository> {
        AccountService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn test_create_account_starts_empty_and_active() {
        let service = service(MockAccountRepository::with_users(&[1]));

        let account = service.create_account(UserId::new(1)).await.unwrap();

        assert_eq!(account.user_id, UserId::new(1));
        assert_eq!(account.balance, Money::ZERO);
        assert!(account.active);
    }

    #[tokio::test]
    async fn test_second_account_for_user_already_exists() {
        let service = service(MockAccountRepository::with_users(&[1]));
        service.create_account(UserId::new(1)).await.unwrap();

        let err = service.create_account(UserId::new(1)).await.unwrap_err();
        assert!(matches!(err, AccountError::AlreadyExists(_)));
        assert_eq!(err.error_code(), "ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn test_create_account_for_unknown_user() {
        let service = service(MockAccountRepository::with_users(&[]));

        let err = service.create_account(UserId::new(5)).await.unwrap_err();
        assert!(matches!(err, AccountError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_set_active_is_idempotent() {
        let service = service(MockAccountRepository::with_users(&[1]));
        let account = service.create_account(UserId::new(1)).await.unwrap();

        assert!(!service.deactivate(account.id).await.unwrap().active);
        assert!(!service.deactivate(account.id).await.unwrap().active);
        assert!(service.activate(account.id).await.unwrap().active);
        assert!(service.find(account.id).await.unwrap().active);
    }

    #[tokio::test]
    async fn test_set_active_unknown_account() {
        let service = service(MockAccountRepository::with_users(&[]));

        let err = service.set_active(AccountId::new(42), true).await.unwrap_err();
        assert!(matches!(err, AccountError::NotFound(id) if id == AccountId::new(42)));
    }

    #[tokio::test]
    async fn test_balance_for_user_without_account() {
        let service = service(MockAccountRepository::with_users(&[1]));

        let err = service.balance_for_user(UserId::new(1)).await.unwrap_err();
        assert!(matches!(err, AccountError::NoAccountForUser(_)));
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_history_for_user_uses_their_account() {
        let mut repo = MockAccountRepository::with_users(&[1, 2]);
        let record = |id: i64, sender: i64, recipient: i64| TransactionRecord {
            id: TransactionId::new(id),
            sender_account_id: AccountId::new(sender),
            recipient_account_id: AccountId::new(recipient),
            amount: Money::from_major(1000),
            concept: String::new(),
            status: TransactionStatus::Completed,
            timestamp: DateTime::parse_from_rfc3339("2026-10-16T10:00:00+00:00").unwrap(),
        };
        repo.transactions = vec![record(1, 1, 2), record(2, 2, 1), record(3, 3, 4)];
        let service = service(repo);

        let account = service.create_account(UserId::new(1)).await.unwrap();
        assert_eq!(account.id, AccountId::new(1));

        let history = service.history_for_user(UserId::new(1)).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(
            service.balance_for_user(UserId::new(1)).await.unwrap(),
            Money::ZERO
        );
    }
}
