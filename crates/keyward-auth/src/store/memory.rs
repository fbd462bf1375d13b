//! In-memory credential store backed by `DashMap`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use keyward_core::error::AppError;
use keyward_core::result::AppResult;
use keyward_entity::user::{NewUser, User};

use super::credential::CredentialStore;
use crate::lockout::{FailedAttempt, FailureThreshold};

/// Credential store held entirely in process memory.
///
/// Per-user updates run under the map's shard write lock, which makes
/// failed-attempt bookkeeping atomic for each user.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    users: DashMap<Uuid, User>,
    /// Lowercased username to user id.
    usernames: DashMap<String, Uuid>,
    /// Lowercased email to user id.
    emails: DashMap<String, Uuid>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_user<T>(&self, user_id: Uuid, f: impl FnOnce(&mut User) -> T) -> AppResult<T> {
        let mut user = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        Ok(f(&mut user))
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<User>> {
        let key = identifier.to_lowercase();
        let id = self
            .usernames
            .get(&key)
            .map(|id| *id.value())
            .or_else(|| self.emails.get(&key).map(|id| *id.value()));

        Ok(id.and_then(|id| self.users.get(&id).map(|user| user.value().clone())))
    }

    async fn find_by_id(&self, user_id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.get(&user_id).map(|user| user.value().clone()))
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = self.users.iter().map(|entry| entry.value().clone()).collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn create_user(&self, data: NewUser, now: DateTime<Utc>) -> AppResult<User> {
        let user = data.into_user(now);
        let username_key = user.username.to_lowercase();

        match self.usernames.entry(username_key.clone()) {
            Entry::Occupied(_) => {
                return Err(AppError::conflict("Username or email is already registered"));
            }
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }

        if let Some(email) = &user.email {
            match self.emails.entry(email.to_lowercase()) {
                Entry::Occupied(_) => {
                    self.usernames.remove(&username_key);
                    return Err(AppError::conflict("Username or email is already registered"));
                }
                Entry::Vacant(slot) => {
                    slot.insert(user.id);
                }
            }
        }

        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn record_failed_attempt(
        &self,
        user_id: Uuid,
        threshold: &FailureThreshold,
    ) -> AppResult<FailedAttempt> {
        self.with_user(user_id, |user| threshold.apply(user))
    }

    async fn reset_attempts(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        self.with_user(user_id, |user| {
            user.failed_attempts = 0;
            user.locked_until = None;
            user.updated_at = now;
        })
    }

    async fn record_successful_attempt(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<DateTime<Utc>>> {
        self.with_user(user_id, |user| {
            if user.is_locked_at(now) {
                return user.locked_until;
            }
            user.failed_attempts = 0;
            user.locked_until = None;
            user.updated_at = now;
            None
        })
    }

    async fn update_password_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        self.with_user(user_id, |user| {
            user.password_hash = password_hash.to_string();
            user.updated_at = now;
        })
    }

    async fn confirm_email(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        self.with_user(user_id, |user| {
            user.email_confirmed = true;
            user.updated_at = now;
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use keyward_core::error::ErrorKind;

    use super::*;

    fn new_user(username: &str, email: Option<&str>) -> NewUser {
        NewUser {
            username: username.into(),
            email: email.map(Into::into),
            password_hash: "hash".into(),
            email_confirmed: false,
        }
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let store = MemoryCredentialStore::new();
        let created = store
            .create_user(new_user("Alice", Some("Alice@Example.com")), Utc::now())
            .await
            .unwrap();

        let by_name = store.find_by_identifier("ALICE").await.unwrap().unwrap();
        let by_email = store
            .find_by_identifier("alice@example.com")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(by_name.id, created.id);
        assert_eq!(by_email.id, created.id);
        assert!(store.find_by_identifier("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_or_email_conflicts() {
        let store = MemoryCredentialStore::new();
        store
            .create_user(new_user("alice", Some("a@example.com")), Utc::now())
            .await
            .unwrap();

        let dup_name = store
            .create_user(new_user("ALICE", None), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(dup_name.kind, ErrorKind::Conflict);

        let dup_email = store
            .create_user(new_user("bob", Some("A@example.com")), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(dup_email.kind, ErrorKind::Conflict);

        // The failed insert must not leave its username reserved.
        assert!(
            store
                .create_user(new_user("bob", None), Utc::now())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_unknown_user_updates_are_not_found() {
        let store = MemoryCredentialStore::new();
        let err = store
            .reset_attempts(Uuid::new_v4(), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_success_keeps_a_lock_in_force() {
        let store = MemoryCredentialStore::new();
        let now = Utc::now();
        let user = store.create_user(new_user("alice", None), now).await.unwrap();
        let threshold = FailureThreshold {
            now,
            max_attempts: 1,
            lock_until: Some(now + Duration::minutes(10)),
        };
        store.record_failed_attempt(user.id, &threshold).await.unwrap();

        let locked = store.record_successful_attempt(user.id, now).await.unwrap();
        assert_eq!(locked, threshold.lock_until);
        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.locked_until, threshold.lock_until);

        let later = now + Duration::minutes(10);
        assert_eq!(store.record_successful_attempt(user.id, later).await.unwrap(), None);
        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.locked_until, None);
        assert_eq!(stored.failed_attempts, 0);
    }

    #[tokio::test]
    async fn test_success_clears_any_count() {
        let store = MemoryCredentialStore::new();
        let now = Utc::now();
        let user = store.create_user(new_user("alice", None), now).await.unwrap();
        let threshold = FailureThreshold {
            now,
            max_attempts: 3,
            lock_until: Some(now + Duration::minutes(10)),
        };
        for _ in 0..2 {
            store.record_failed_attempt(user.id, &threshold).await.unwrap();
        }

        assert_eq!(store.record_successful_attempt(user.id, now).await.unwrap(), None);
        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.failed_attempts, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_failures_each_count() {
        let store = Arc::new(MemoryCredentialStore::new());
        let user = store
            .create_user(new_user("alice", None), Utc::now())
            .await
            .unwrap();

        let threshold = FailureThreshold {
            now: Utc::now(),
            max_attempts: 1000,
            lock_until: Some(Utc::now() + Duration::minutes(10)),
        };

        let user_id = user.id;
        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.record_failed_attempt(user_id, &threshold).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.failed_attempts, 50);
    }
}
