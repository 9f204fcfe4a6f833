//! Authentication, account lockout and user administration.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - The two-state lockout machine (`Active` / `Blocked`)
//! - The login flow gating credential issuance
//! - Admin block, unlock and listing operations

mod error;
mod lockout;
mod password;
mod service;
mod types;

#[cfg(test)]
mod lockout_props;

pub use error::AuthError;
pub use lockout::{LockStatus, LockoutEvent, LockoutPolicy, LockoutState, LockoutTransition};
pub use password::{PasswordError, hash_password, verify_password};
pub use service::{CredentialIssuer, LoginService, MIN_PASSWORD_LEN, UserStore};
pub use types::{LoginOutcome, NewUser, User, UserProfile};
