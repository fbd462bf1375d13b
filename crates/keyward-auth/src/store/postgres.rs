//! PostgreSQL-backed credential store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use keyward_core::error::AppError;
use keyward_core::result::AppResult;
use keyward_database::repositories::UserRepository;
use keyward_entity::user::{NewUser, User};

use super::credential::CredentialStore;
use crate::lockout::{FailedAttempt, FailureThreshold};

/// Credential store over the `users` table.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    users: UserRepository,
}

impl PgCredentialStore {
    /// Creates the store from a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<User>> {
        self.users.find_by_identifier(identifier).await
    }

    async fn find_by_id(&self, user_id: Uuid) -> AppResult<Option<User>> {
        self.users.find_by_id(user_id).await
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.users.find_all().await
    }

    async fn create_user(&self, user: NewUser, now: DateTime<Utc>) -> AppResult<User> {
        self.users.create(user, now).await
    }

    async fn record_failed_attempt(
        &self,
        user_id: Uuid,
        threshold: &FailureThreshold,
    ) -> AppResult<FailedAttempt> {
        let max_attempts = i32::try_from(threshold.max_attempts).unwrap_or(i32::MAX);
        let updated = self
            .users
            .record_failed_attempt(user_id, threshold.now, max_attempts, threshold.lock_until)
            .await?;

        if let Some((failed_attempts, locked_until)) = updated {
            // The row was open before this update, so any lock in force is ours.
            return Ok(FailedAttempt {
                failed_attempts: failed_attempts.max(0) as u32,
                locked_until,
                newly_locked: locked_until.is_some_and(|until| until > threshold.now),
            });
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;

        Ok(FailedAttempt {
            failed_attempts: user.failed_attempts.max(0) as u32,
            locked_until: user.locked_until,
            newly_locked: false,
        })
    }

    async fn reset_attempts(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        self.users.reset_attempts(user_id, now).await
    }

    async fn record_successful_attempt(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<DateTime<Utc>>> {
        self.users
            .reset_attempts_unless_locked(user_id, now)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    async fn update_password_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        self.users.update_password_hash(user_id, password_hash, now).await
    }

    async fn confirm_email(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        self.users.confirm_email(user_id, now).await
    }
}
