//! Account domain types.

use chrono::{DateTime, Utc};
use remesa_shared::types::{AccountId, Money, UserId};
use serde::{Deserialize, Serialize};

use crate::transfer::AccountState;

/// A retail account. Each user owns at most one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Owning user.
    pub user_id: UserId,
    /// Current balance, never negative.
    pub balance: Money,
    /// Inactive accounts cannot receive transfers.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Projection used by the transfer policy.
    #[must_use]
    pub const fn state(&self) -> AccountState {
        AccountState {
            id: self.id,
            balance: self.balance,
            active: self.active,
        }
    }
}
