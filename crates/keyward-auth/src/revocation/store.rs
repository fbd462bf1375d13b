//! Revocation store abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use keyward_core::result::AppResult;

/// Durable record of revoked sessions.
///
/// Two kinds of entry exist: a single revoked session, and a per-user
/// issued-at cutoff (milliseconds) revoking every session issued at or
/// before it. An entry is in force while its expiry is after `now`. Entries
/// are never evicted before they expire, and a write is visible to every
/// read issued after it returns.
#[async_trait]
pub trait RevocationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Revoke one session until `expires_at`. Re-revoking keeps the later expiry.
    async fn revoke_session(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Whether `session_id` is revoked at `now`.
    async fn is_session_revoked(&self, session_id: Uuid, now: DateTime<Utc>) -> AppResult<bool>;

    /// Revoke every session of `user_id` issued at or before `cutoff_ms`, until
    /// `expires_at`. An existing entry keeps the later cutoff and expiry.
    async fn revoke_user_before(
        &self,
        user_id: Uuid,
        cutoff_ms: i64,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// The cutoff in force for `user_id` at `now`.
    async fn user_cutoff(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<Option<i64>>;

    /// Drop entries expired at `now`. Returns how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}
