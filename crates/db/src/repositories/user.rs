//! User repository for database operations.
//!
//! Lockout counter and block flag are only written here, together, under a
//! row lock.

use chrono::Utc;
use remesa_core::auth::{
    AuthError, LockoutEvent, LockoutPolicy, LockoutState, LockoutTransition, NewUser, User,
    UserStore,
};
use remesa_shared::auth::Role;
use remesa_shared::types::UserId;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};

use super::error::{StoreFailure, auth_error, classify};
use crate::entities::{sea_orm_active_enums::UserRole, users};

/// User repository for CRUD and lockout operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl UserStore for UserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(auth_error)?;

        Ok(model.map(to_domain))
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>, AuthError> {
        let model = users::Entity::find_by_id(user_id.into_inner())
            .one(&self.db)
            .await
            .map_err(auth_error)?;

        Ok(model.map(to_domain))
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AuthError> {
        let email = user.email.clone();
        let model = users::ActiveModel {
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            role: Set(UserRole::from(user.role)),
            failed_attempts: Set(0),
            blocked: Set(false),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| match classify(&e) {
            StoreFailure::UniqueViolation(_) => AuthError::EmailTaken(email),
            _ => auth_error(e),
        })?;

        Ok(to_domain(model))
    }

    async fn list_by_blocked(&self, blocked: bool) -> Result<Vec<User>, AuthError> {
        let models = users::Entity::find()
            .filter(users::Column::Blocked.eq(blocked))
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await
            .map_err(auth_error)?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn update_lockout(
        &self,
        user_id: UserId,
        event: LockoutEvent,
        policy: LockoutPolicy,
    ) -> Result<Option<LockoutTransition>, AuthError> {
        let txn = self.db.begin().await.map_err(auth_error)?;

        let Some(model) = users::Entity::find_by_id(user_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(auth_error)?
        else {
            txn.commit().await.map_err(auth_error)?;
            return Ok(None);
        };

        let state = LockoutState::from_stored(model.failed_attempts, model.blocked);
        let transition = policy.apply(state, event);

        if transition.changed() {
            let mut active = model.into_active_model();
            active.failed_attempts = Set(i32::from(transition.current.failed_attempts));
            active.blocked = Set(transition.current.blocked);
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await.map_err(auth_error)?;
        }

        txn.commit().await.map_err(auth_error)?;
        Ok(Some(transition))
    }
}

fn to_domain(model: users::Model) -> User {
    User {
        id: UserId::new(model.id),
        email: model.email,
        password_hash: model.password_hash,
        role: Role::from(model.role),
        lockout: LockoutState::from_stored(model.failed_attempts, model.blocked),
    }
}
