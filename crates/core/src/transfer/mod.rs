//! Transfer engine.
//!
//! This module implements atomic money movement between accounts:
//! - Typed transfer requests and their parse step
//! - Ordered precondition policy (limits, funds, caps)
//! - The `TransferStore` unit-of-work seam implemented by the db crate
//! - Outcome reporting through `TransferObserver`

pub mod error;
pub mod observer;
pub mod policy;
pub mod service;
pub mod types;

#[cfg(test)]
mod policy_props;

pub use error::TransferError;
pub use observer::{NoopObserver, TracingObserver, TransferObserver};
pub use policy::TransferPolicy;
pub use service::{TransferEngine, TransferStore};
pub use types::{
    AccountState, AmountInput, TransactionRecord, TransactionStatus, TransferCommand,
    TransferReceipt, TransferRequest, TransferSnapshot,
};
