//! `SeaORM` entity definitions.

pub mod accounts;
pub mod daily_received_totals;
pub mod daily_sent_totals;
pub mod sea_orm_active_enums;
pub mod transactions;
pub mod users;
