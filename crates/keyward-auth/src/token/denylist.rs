//! Revocation denylist for session tokens.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use keyward_core::error::AppError;

use super::claims::SessionClaims;
use crate::revocation::RevocationStore;

/// Expired entries are purged after this many revocations.
const PURGE_EVERY: u64 = 256;

/// Tracks revoked sessions in a [`RevocationStore`].
///
/// Logout revokes a single session. A password change writes a per-user
/// cutoff that revokes every session issued at or before it. Entries live
/// exactly as long as the sessions they revoke could.
#[derive(Debug)]
pub struct SessionDenylist {
    store: Arc<dyn RevocationStore>,
    /// Full session lifetime.
    retention: Duration,
    writes: AtomicU64,
}

impl SessionDenylist {
    /// Creates a denylist whose entries live for at most `retention`.
    pub fn new(store: Arc<dyn RevocationStore>, retention: Duration) -> Self {
        Self {
            store,
            retention,
            writes: AtomicU64::new(0),
        }
    }

    /// Revokes a single session until it would have expired anyway.
    pub async fn revoke_session(
        &self,
        claims: &SessionClaims,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.store
            .revoke_session(claims.sid, claims.sub, claims.expires_at())
            .await?;

        info!(user_id = %claims.sub, session_id = %claims.sid, "Session revoked");
        self.after_write(now).await;
        Ok(())
    }

    /// Revokes every session of `user_id` issued at or before `now`.
    pub async fn revoke_user_sessions(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        // Expiry is rounded up to the whole second after `iat + ttl`.
        let expires_at = now + self.retention + Duration::seconds(1);
        self.store
            .revoke_user_before(user_id, now.timestamp_millis(), expires_at)
            .await?;

        info!(user_id = %user_id, "All sessions revoked");
        self.after_write(now).await;
        Ok(())
    }

    /// Whether the session described by `claims` is revoked at `now`.
    pub async fn is_revoked(
        &self,
        claims: &SessionClaims,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        if self.store.is_session_revoked(claims.sid, now).await? {
            return Ok(true);
        }

        let cutoff = self.store.user_cutoff(claims.sub, now).await?;
        Ok(cutoff.is_some_and(|cutoff| claims.iat_ms <= cutoff))
    }

    /// Drops entries whose sessions have expired by `now`.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let removed = self.store.purge_expired(now).await?;
        debug!(removed, "Expired revocations purged");
        Ok(removed)
    }

    async fn after_write(&self, now: DateTime<Utc>) {
        if (self.writes.fetch_add(1, Ordering::Relaxed) + 1) % PURGE_EVERY != 0 {
            return;
        }
        if let Err(e) = self.purge_expired(now).await {
            warn!(error = %e, "Failed to purge expired revocations");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::revocation::MemoryRevocationStore;

    use super::*;

    fn denylist() -> (SessionDenylist, Arc<MemoryRevocationStore>) {
        let store = Arc::new(MemoryRevocationStore::new());
        (SessionDenylist::new(store.clone(), Duration::hours(10)), store)
    }

    #[tokio::test]
    async fn test_session_revocation_is_per_session() {
        let (denylist, _) = denylist();
        let now = Utc::now();
        let user = Uuid::new_v4();
        let a = SessionClaims::new(user, now, Duration::hours(10));
        let b = SessionClaims::new(user, now, Duration::hours(10));

        denylist.revoke_session(&a, now).await.unwrap();

        assert!(denylist.is_revoked(&a, now).await.unwrap());
        assert!(!denylist.is_revoked(&b, now).await.unwrap());
    }

    #[tokio::test]
    async fn test_user_cutoff_spares_later_sessions() {
        let (denylist, _) = denylist();
        let now = Utc::now();
        let user = Uuid::new_v4();
        let before = SessionClaims::new(user, now, Duration::hours(10));

        denylist.revoke_user_sessions(user, now).await.unwrap();
        let after = SessionClaims::new(user, now + Duration::milliseconds(1), Duration::hours(10));

        assert!(denylist.is_revoked(&before, now).await.unwrap());
        assert!(!denylist.is_revoked(&after, now).await.unwrap());

        let other = SessionClaims::new(Uuid::new_v4(), now, Duration::hours(10));
        assert!(!denylist.is_revoked(&other, now).await.unwrap());
    }

    #[tokio::test]
    async fn test_cutoff_outlives_every_session_it_revokes() {
        let (denylist, _) = denylist();
        let now = Utc::now();
        let user = Uuid::new_v4();
        let session = SessionClaims::new(user, now, Duration::hours(10));

        denylist.revoke_user_sessions(user, now).await.unwrap();

        let last_valid = session.expires_at() - Duration::milliseconds(1);
        assert!(denylist.is_revoked(&session, last_valid).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_entries_are_purged_periodically() {
        let (denylist, store) = denylist();
        let start = Utc::now();
        let user = Uuid::new_v4();

        for _ in 0..PURGE_EVERY - 1 {
            let claims = SessionClaims::new(user, start, Duration::hours(10));
            denylist.revoke_session(&claims, start).await.unwrap();
        }
        assert_eq!(store.len() as u64, PURGE_EVERY - 1);

        let later = start + Duration::hours(11);
        let live = SessionClaims::new(user, later, Duration::hours(10));
        denylist.revoke_session(&live, later).await.unwrap();

        assert_eq!(store.len(), 1);
        assert!(denylist.is_revoked(&live, later).await.unwrap());
    }
}
