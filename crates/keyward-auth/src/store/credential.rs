//! Credential store abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use keyward_core::result::AppResult;
use keyward_entity::user::{NewUser, User};

use crate::lockout::{FailedAttempt, FailureThreshold};

/// Persistence for user credentials and lockout bookkeeping.
///
/// Identifier lookups are case-insensitive over username and email.
/// [`CredentialStore::record_failed_attempt`] must be atomic per user:
/// concurrent failures for the same user each count exactly once.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a user by username or email.
    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<User>>;

    /// Find a user by id.
    async fn find_by_id(&self, user_id: Uuid) -> AppResult<Option<User>>;

    /// List every user.
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Insert a user. Fails with a conflict when the username or email is taken.
    async fn create_user(&self, user: NewUser, now: DateTime<Utc>) -> AppResult<User>;

    /// Record one failed sign-in and apply the lockout threshold.
    async fn record_failed_attempt(
        &self,
        user_id: Uuid,
        threshold: &FailureThreshold,
    ) -> AppResult<FailedAttempt>;

    /// Clear the failure counter and any lock.
    async fn reset_attempts(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<()>;

    /// Clear the failure counter after a successful sign-in, unless the user
    /// is locked at `now`.
    ///
    /// Atomic per user, like [`CredentialStore::record_failed_attempt`]: a
    /// lock written by a concurrent failure is never cleared. Returns the lock
    /// expiry when the user is locked; nothing changes then.
    async fn record_successful_attempt(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<DateTime<Utc>>>;

    /// Replace the stored password hash.
    async fn update_password_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Mark the user's email address as confirmed.
    async fn confirm_email(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<()>;
}
