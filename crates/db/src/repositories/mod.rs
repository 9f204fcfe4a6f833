//! Repository abstractions for data access.
//!
//! Repositories implement the core persistence traits, hiding the `SeaORM`
//! implementation details from the rest of the application.

mod error;

pub mod account;
pub mod transaction;
pub mod transfer;
pub mod user;

pub use account::AccountRepository;
pub use transaction::TransactionRepository;
pub use transfer::TransferRepository;
pub use user::UserRepository;
