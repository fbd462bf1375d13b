//! In-memory revocation store backed by `DashMap`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use keyward_core::result::AppResult;

use super::store::RevocationStore;

/// Revocation store held in process memory.
///
/// Unbounded: entries leave only through [`RevocationStore::purge_expired`].
/// Only suitable when a single process validates every session.
#[derive(Debug, Default)]
pub struct MemoryRevocationStore {
    /// Session id to revocation expiry.
    sessions: DashMap<Uuid, DateTime<Utc>>,
    /// User id to `(cutoff_ms, expiry)`.
    cutoffs: DashMap<Uuid, (i64, DateTime<Utc>)>,
}

impl MemoryRevocationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held, expired or not.
    pub fn len(&self) -> usize {
        self.sessions.len() + self.cutoffs.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke_session(
        &self,
        session_id: Uuid,
        _user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.sessions
            .entry(session_id)
            .and_modify(|current| *current = (*current).max(expires_at))
            .or_insert(expires_at);
        Ok(())
    }

    async fn is_session_revoked(&self, session_id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        Ok(self
            .sessions
            .get(&session_id)
            .is_some_and(|expires_at| now < *expires_at.value()))
    }

    async fn revoke_user_before(
        &self,
        user_id: Uuid,
        cutoff_ms: i64,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.cutoffs
            .entry(user_id)
            .and_modify(|(cutoff, expiry)| {
                *cutoff = (*cutoff).max(cutoff_ms);
                *expiry = (*expiry).max(expires_at);
            })
            .or_insert((cutoff_ms, expires_at));
        Ok(())
    }

    async fn user_cutoff(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<Option<i64>> {
        Ok(self
            .cutoffs
            .get(&user_id)
            .map(|entry| *entry.value())
            .filter(|(_, expires_at)| now < *expires_at)
            .map(|(cutoff, _)| cutoff))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut removed = 0u64;
        self.sessions.retain(|_, expires_at| {
            let keep = now < *expires_at;
            removed += u64::from(!keep);
            keep
        });
        self.cutoffs.retain(|_, (_, expires_at)| {
            let keep = now < *expires_at;
            removed += u64::from(!keep);
            keep
        });
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[tokio::test]
    async fn test_session_entry_lapses_at_expiry() {
        let store = MemoryRevocationStore::new();
        let now = Utc::now();
        let session = Uuid::new_v4();
        store
            .revoke_session(session, Uuid::new_v4(), now + Duration::hours(1))
            .await
            .unwrap();

        assert!(store.is_session_revoked(session, now).await.unwrap());
        assert!(!store.is_session_revoked(Uuid::new_v4(), now).await.unwrap());
        assert!(
            !store
                .is_session_revoked(session, now + Duration::hours(1))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_cutoff_only_moves_forward() {
        let store = MemoryRevocationStore::new();
        let now = Utc::now();
        let user = Uuid::new_v4();
        let expiry = now + Duration::hours(10);

        store.revoke_user_before(user, 2_000, expiry).await.unwrap();
        store.revoke_user_before(user, 1_000, expiry).await.unwrap();

        assert_eq!(store.user_cutoff(user, now).await.unwrap(), Some(2_000));
        assert_eq!(store.user_cutoff(user, expiry).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entries_are_never_evicted_before_expiry() {
        let store = MemoryRevocationStore::new();
        let now = Utc::now();
        let first = Uuid::new_v4();
        store
            .revoke_session(first, Uuid::new_v4(), now + Duration::hours(1))
            .await
            .unwrap();

        for _ in 0..10_000 {
            store
                .revoke_session(Uuid::new_v4(), Uuid::new_v4(), now + Duration::hours(1))
                .await
                .unwrap();
        }

        assert!(store.is_session_revoked(first, now).await.unwrap());
    }

    #[tokio::test]
    async fn test_purge_drops_only_expired() {
        let store = MemoryRevocationStore::new();
        let now = Utc::now();
        let live = Uuid::new_v4();
        store
            .revoke_session(live, Uuid::new_v4(), now + Duration::hours(1))
            .await
            .unwrap();
        store
            .revoke_session(Uuid::new_v4(), Uuid::new_v4(), now)
            .await
            .unwrap();
        store
            .revoke_user_before(Uuid::new_v4(), 1, now - Duration::seconds(1))
            .await
            .unwrap();

        assert_eq!(store.purge_expired(now).await.unwrap(), 2);
        assert_eq!(store.len(), 1);
        assert!(store.is_session_revoked(live, now).await.unwrap());
    }
}
