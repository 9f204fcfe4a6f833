//! `SeaORM` Entity for transactions table.
//!
//! Rows are append-only; a trigger rejects UPDATE and DELETE.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TransferStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub sender_account_id: i64,
    pub receiver_account_id: i64,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub amount: Decimal,
    #[sea_orm(column_type = "Text")]
    pub concept: String,
    pub status: TransferStatus,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::SenderAccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Sender,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::ReceiverAccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Receiver,
}

impl ActiveModelBehavior for ActiveModel {}
