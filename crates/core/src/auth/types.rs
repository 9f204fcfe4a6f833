//! User and credential types.

use remesa_shared::auth::{AccessToken, Role};
use remesa_shared::types::UserId;
use serde::{Deserialize, Serialize};

use super::lockout::LockoutState;

/// Stored user with credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Login email, lowercase.
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Role.
    pub role: Role,
    /// Lockout counter and flag.
    pub lockout: LockoutState,
}

impl User {
    /// Public view without the password hash.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
            failed_attempts: self.lockout.failed_attempts,
            blocked: self.lockout.blocked,
        }
    }
}

/// Input for inserting a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Login email, lowercase.
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Role.
    pub role: Role,
}

/// User as shown to the user or an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User ID.
    pub id: UserId,
    /// Login email.
    pub email: String,
    /// Role.
    pub role: Role,
    /// Consecutive failed logins.
    pub failed_attempts: u8,
    /// Whether logins are rejected.
    pub blocked: bool,
}

/// Successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginOutcome {
    /// Authenticated user.
    pub user_id: UserId,
    /// Role carried by the credential.
    pub role: Role,
    /// Issued credential.
    pub credential: AccessToken,
}
