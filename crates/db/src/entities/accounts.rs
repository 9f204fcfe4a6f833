//! `SeaORM` Entity for accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub user_id: i64,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub balance: Decimal,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(has_many = "super::daily_sent_totals::Entity")]
    DailySentTotals,
    #[sea_orm(has_many = "super::daily_received_totals::Entity")]
    DailyReceivedTotals,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::daily_sent_totals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailySentTotals.def()
    }
}

impl Related<super::daily_received_totals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyReceivedTotals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
