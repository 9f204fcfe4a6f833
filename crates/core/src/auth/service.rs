//! Login flow and user administration.

use std::sync::Arc;

use remesa_shared::auth::{AccessToken, Role};
use remesa_shared::jwt::JwtService;
use remesa_shared::types::UserId;
use tracing::{info, warn};

use super::error::AuthError;
use super::lockout::{LockoutEvent, LockoutPolicy, LockoutTransition};
use super::password::{hash_password, verify_password};
use super::types::{LoginOutcome, NewUser, User, UserProfile};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Repository trait for user persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait UserStore: Send + Sync {
    /// Find user by email (already normalised to lowercase).
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, AuthError>> + Send;

    /// Find user by ID.
    fn find_by_id(
        &self,
        user_id: UserId,
    ) -> impl std::future::Future<Output = Result<Option<User>, AuthError>> + Send;

    /// Inserts a user. Must fail with `AuthError::EmailTaken` on a duplicate email.
    fn create_user(
        &self,
        user: NewUser,
    ) -> impl std::future::Future<Output = Result<User, AuthError>> + Send;

    /// Users filtered by block flag, ordered by id.
    fn list_by_blocked(
        &self,
        blocked: bool,
    ) -> impl std::future::Future<Output = Result<Vec<User>, AuthError>> + Send;

    /// Applies a lockout event atomically: lock the user row, run
    /// `policy.apply` on the stored state, write counter and flag together.
    /// Returns `None` if the user does not exist.
    fn update_lockout(
        &self,
        user_id: UserId,
        event: LockoutEvent,
        policy: LockoutPolicy,
    ) -> impl std::future::Future<Output = Result<Option<LockoutTransition>, AuthError>> + Send;
}

/// Opaque credential issuance.
pub trait CredentialIssuer: Send + Sync {
    /// Issues a credential for an authenticated user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Credential` if issuance fails.
    fn issue(&self, user_id: UserId, role: Role) -> Result<AccessToken, AuthError>;
}

impl CredentialIssuer for JwtService {
    fn issue(&self, user_id: UserId, role: Role) -> Result<AccessToken, AuthError> {
        self.generate_access_token(user_id, role)
            .map_err(|e| AuthError::Credential(e.to_string()))
    }
}

/// Authentication and user administration.
pub struct LoginService<U: UserStore, I: CredentialIssuer> {
    users: Arc<U>,
    issuer: Arc<I>,
    policy: LockoutPolicy,
}

impl<U: UserStore, I: CredentialIssuer> LoginService<U, I> {
    /// Create a new login service.
    #[must_use]
    pub fn new(users: Arc<U>, issuer: Arc<I>, policy: LockoutPolicy) -> Self {
        Self {
            users,
            issuer,
            policy,
        }
    }

    /// Authenticates a user and issues a credential.
    ///
    /// A blocked user is rejected before the password is looked at. The
    /// password is verified outside any row lock; only the lockout update
    /// itself is serialised by the store. The credential is issued after the
    /// lockout update has committed.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidCredentials` for an unknown email or wrong password
    /// - `AuthError::Blocked` if the user is, or concurrently became, blocked
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let email = normalize_email(email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if user.lockout.is_blocked() {
            return Err(AuthError::Blocked(user.id));
        }

        if !verify_password(password, &user.password_hash)? {
            let transition = self.record(user.id, LockoutEvent::Failure).await?;
            if transition.became_blocked() {
                warn!(
                    user_id = %user.id,
                    failed_attempts = transition.current.failed_attempts,
                    "User blocked after repeated failed logins"
                );
            }
            return Err(AuthError::InvalidCredentials);
        }

        let transition = self.record(user.id, LockoutEvent::Success).await?;
        if transition.current.is_blocked() {
            return Err(AuthError::Blocked(user.id));
        }

        let credential = self.issuer.issue(user.id, user.role)?;
        Ok(LoginOutcome {
            user_id: user.id,
            role: user.role,
            credential,
        })
    }

    /// Registers a user with a hashed password.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidInput` for a malformed email or short password
    /// - `AuthError::EmailTaken` if the email is registered
    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<UserProfile, AuthError> {
        let email = normalize_email(email);
        validate_email(&email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let user = self
            .users
            .create_user(NewUser {
                email,
                password_hash: hash_password(password)?,
                role,
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user.profile())
    }

    /// Profile of a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user does not exist.
    pub async fn profile(&self, user_id: UserId) -> Result<UserProfile, AuthError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|u| u.profile())
            .ok_or(AuthError::UserNotFound(user_id))
    }

    /// Users filtered by block flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    pub async fn users_by_blocked(&self, blocked: bool) -> Result<Vec<UserProfile>, AuthError> {
        let users = self.users.list_by_blocked(blocked).await?;
        Ok(users.iter().map(User::profile).collect())
    }

    /// Administratively blocks a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user does not exist.
    pub async fn block_user(&self, user_id: UserId) -> Result<LockoutTransition, AuthError> {
        let transition = self.record(user_id, LockoutEvent::Block).await?;
        info!(user_id = %user_id, "User blocked by administrator");
        Ok(transition)
    }

    /// Administratively unlocks a user and clears the failure counter.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user does not exist.
    pub async fn unlock_user(&self, user_id: UserId) -> Result<LockoutTransition, AuthError> {
        let transition = self.record(user_id, LockoutEvent::Unlock).await?;
        info!(user_id = %user_id, "User unlocked by administrator");
        Ok(transition)
    }

    async fn record(
        &self,
        user_id: UserId,
        event: LockoutEvent,
    ) -> Result<LockoutTransition, AuthError> {
        self.users
            .update_lockout(user_id, event, self.policy)
            .await?
            .ok_or(AuthError::UserNotFound(user_id))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'))
        && !email.contains(char::is_whitespace);
    if valid {
        Ok(())
    } else {
        Err(AuthError::InvalidInput(format!("'{email}' is not a valid email")))
    }
}
