//! Account lifecycle: one account per user, activation flag, balance and
//! history lookups.

mod error;
mod service;
mod types;

pub use error::AccountError;
pub use service::{AccountRepository, AccountService};
pub use types::Account;
