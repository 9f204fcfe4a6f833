//! Core ledger logic for Remesa.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached through traits implemented by the db crate.
//!
//! # Modules
//!
//! - `transfer` - Atomic transfers with ordered precondition checks
//! - `account` - Account lifecycle, balance and history lookups
//! - `auth` - Login, account lockout state machine, user administration
//! - `calendar` - Reference timezone and injectable clock

pub mod account;
pub mod auth;
pub mod calendar;
pub mod transfer;

pub use calendar::LedgerCalendar;
