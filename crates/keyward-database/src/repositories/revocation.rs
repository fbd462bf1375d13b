//! Session revocation repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use keyward_core::error::{AppError, ErrorKind};
use keyward_core::result::AppResult;

/// Repository for the `revoked_sessions` and `session_cutoffs` tables.
///
/// Rows stay in force while `expires_at` is after the caller's `now`;
/// expired rows are ignored by reads and removed by [`RevocationRepository::purge_expired`].
#[derive(Debug, Clone)]
pub struct RevocationRepository {
    pool: PgPool,
}

impl RevocationRepository {
    /// Create a new revocation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Revoke one session until `expires_at`. Re-revoking keeps the later expiry.
    pub async fn revoke_session(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO revoked_sessions (session_id, user_id, expires_at) VALUES ($1, $2, $3) \
             ON CONFLICT (session_id) DO UPDATE \
             SET expires_at = GREATEST(revoked_sessions.expires_at, EXCLUDED.expires_at)",
        )
        .bind(session_id)
        .bind(user_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to revoke session", e))?;
        Ok(())
    }

    /// Whether `session_id` is revoked at `now`.
    pub async fn is_session_revoked(&self, session_id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM revoked_sessions WHERE session_id = $1 AND expires_at > $2)",
        )
        .bind(session_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check session revocation", e)
        })
    }

    /// Revoke every session of `user_id` issued at or before `cutoff_ms`.
    ///
    /// An existing row keeps the later cutoff and the later expiry.
    pub async fn revoke_user_before(
        &self,
        user_id: Uuid,
        cutoff_ms: i64,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO session_cutoffs (user_id, cutoff_ms, expires_at) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id) DO UPDATE SET \
             cutoff_ms = GREATEST(session_cutoffs.cutoff_ms, EXCLUDED.cutoff_ms), \
             expires_at = GREATEST(session_cutoffs.expires_at, EXCLUDED.expires_at)",
        )
        .bind(user_id)
        .bind(cutoff_ms)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to revoke user sessions", e)
        })?;
        Ok(())
    }

    /// The cutoff in force for `user_id` at `now`, in milliseconds.
    pub async fn user_cutoff(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<Option<i64>> {
        sqlx::query_scalar::<_, i64>(
            "SELECT cutoff_ms FROM session_cutoffs WHERE user_id = $1 AND expires_at > $2",
        )
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load session cutoff", e))
    }

    /// Delete rows expired at `now`. Returns how many were removed.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let sessions = sqlx::query("DELETE FROM revoked_sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to purge revoked sessions", e)
            })?;

        let cutoffs = sqlx::query("DELETE FROM session_cutoffs WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to purge session cutoffs", e)
            })?;

        Ok(sessions.rows_affected() + cutoffs.rows_affected())
    }
}
