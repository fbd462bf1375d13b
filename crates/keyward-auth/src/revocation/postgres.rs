//! PostgreSQL-backed revocation store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use keyward_core::result::AppResult;
use keyward_database::repositories::RevocationRepository;

use super::store::RevocationStore;

/// Revocation store over the `revoked_sessions` and `session_cutoffs` tables.
///
/// Shared by every process using the same database, so a logout in one
/// process is honoured by all of them.
#[derive(Debug, Clone)]
pub struct PgRevocationStore {
    revocations: RevocationRepository,
}

impl PgRevocationStore {
    /// Creates the store from a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            revocations: RevocationRepository::new(pool),
        }
    }
}

#[async_trait]
impl RevocationStore for PgRevocationStore {
    async fn revoke_session(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.revocations
            .revoke_session(session_id, user_id, expires_at)
            .await
    }

    async fn is_session_revoked(&self, session_id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        self.revocations.is_session_revoked(session_id, now).await
    }

    async fn revoke_user_before(
        &self,
        user_id: Uuid,
        cutoff_ms: i64,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.revocations
            .revoke_user_before(user_id, cutoff_ms, expires_at)
            .await
    }

    async fn user_cutoff(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<Option<i64>> {
        self.revocations.user_cutoff(user_id, now).await
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        self.revocations.purge_expired(now).await
    }
}
