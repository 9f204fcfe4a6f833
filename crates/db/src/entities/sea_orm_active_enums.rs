//! Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use remesa_core::transfer::TransactionStatus;
use remesa_shared::auth::Role;

/// `user_role` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
pub enum UserRole {
    #[sea_orm(string_value = "normal")]
    Normal,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl From<UserRole> for Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Normal => Self::Normal,
            UserRole::Admin => Self::Admin,
        }
    }
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Normal => Self::Normal,
            Role::Admin => Self::Admin,
        }
    }
}

/// `transfer_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transfer_status")]
pub enum TransferStatus {
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl From<TransferStatus> for TransactionStatus {
    fn from(status: TransferStatus) -> Self {
        match status {
            TransferStatus::Completed => Self::Completed,
        }
    }
}
