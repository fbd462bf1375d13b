//! User claim repository.

use sqlx::PgPool;
use uuid::Uuid;

use keyward_core::error::{AppError, ErrorKind};
use keyward_core::result::AppResult;
use keyward_entity::claim::Claim;

/// Repository for the `user_claims` table.
#[derive(Debug, Clone)]
pub struct ClaimRepository {
    pool: PgPool,
}

impl ClaimRepository {
    /// Create a new claim repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Claims held by a user.
    pub async fn claims_of(&self, user_id: Uuid) -> AppResult<Vec<Claim>> {
        sqlx::query_as::<_, Claim>(
            "SELECT claim_type, claim_value FROM user_claims WHERE user_id = $1 \
             ORDER BY claim_type, claim_value",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load user claims", e))
    }

    /// Attach a claim to a user. Idempotent.
    pub async fn add(&self, user_id: Uuid, claim: &Claim) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO user_claims (user_id, claim_type, claim_value) VALUES ($1, $2, $3) \
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(&claim.claim_type)
        .bind(&claim.value)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add claim", e))?;
        Ok(())
    }

    /// Detach a claim. Returns `true` if a row was removed.
    pub async fn remove(&self, user_id: Uuid, claim: &Claim) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM user_claims WHERE user_id = $1 AND claim_type = $2 AND claim_value = $3",
        )
        .bind(user_id)
        .bind(&claim.claim_type)
        .bind(&claim.value)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to remove claim", e))?;
        Ok(result.rows_affected() > 0)
    }
}
