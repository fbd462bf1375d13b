//! User repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use keyward_core::error::{AppError, ErrorKind};
use keyward_core::result::AppResult;
use keyward_entity::user::{NewUser, User};

use super::map_write_error;

/// Counter and lock state returned by [`UserRepository::record_failed_attempt`].
pub type AttemptRow = (i32, Option<DateTime<Utc>>);

/// Repository for user CRUD and lockout bookkeeping.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find a user by username or email (case-insensitive).
    pub async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($1) \
             ORDER BY (LOWER(username) = LOWER($1)) DESC LIMIT 1",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find user by identifier", e)
        })
    }

    /// List all users, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))
    }

    /// Insert a new user.
    pub async fn create(&self, data: NewUser, now: DateTime<Utc>) -> AppResult<User> {
        let user = data.into_user(now);

        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, failed_attempts, \
             locked_until, email_confirmed, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.failed_attempts)
        .bind(user.locked_until)
        .bind(user.email_confirmed)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(e, "Username or email is already registered", "Failed to create user")
        })?;

        Ok(user)
    }

    /// Atomically records one failed sign-in.
    ///
    /// The counter increments; when it reaches `max_attempts` and `lock_until`
    /// is given, the user is locked and the counter resets. A user locked at
    /// `now` is left untouched and, like a missing user, yields `None`.
    /// Concurrent calls serialize on the row lock and re-check the lock
    /// condition against the row they finally update.
    pub async fn record_failed_attempt(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        max_attempts: i32,
        lock_until: Option<DateTime<Utc>>,
    ) -> AppResult<Option<AttemptRow>> {
        sqlx::query_as::<_, AttemptRow>(
            r#"
            UPDATE users SET
                failed_attempts = CASE
                    WHEN $4::timestamptz IS NOT NULL AND failed_attempts + 1 >= $3 THEN 0
                    ELSE failed_attempts + 1
                END,
                locked_until = CASE
                    WHEN $4::timestamptz IS NOT NULL AND failed_attempts + 1 >= $3 THEN $4::timestamptz
                    ELSE locked_until
                END,
                updated_at = $2
            WHERE id = $1 AND (locked_until IS NULL OR locked_until <= $2)
            RETURNING failed_attempts, locked_until
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(max_attempts)
        .bind(lock_until)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record failed attempt", e)
        })
    }

    /// Clears the failure counter and any lock.
    pub async fn reset_attempts(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET failed_attempts = 0, locked_until = NULL, updated_at = $2 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reset attempts", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        Ok(())
    }

    /// Atomically clears the failure counter after a successful sign-in.
    ///
    /// A user locked at `now` is left untouched. Otherwise the counter and any
    /// lapsed lock are cleared. Returns `None` when no such user exists, else
    /// the lock expiry still in force after the update.
    pub async fn reset_attempts_unless_locked(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Option<DateTime<Utc>>>> {
        sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
            r#"
            UPDATE users SET
                failed_attempts = CASE
                    WHEN locked_until IS NOT NULL AND locked_until > $2 THEN failed_attempts
                    ELSE 0
                END,
                locked_until = CASE
                    WHEN locked_until IS NOT NULL AND locked_until > $2 THEN locked_until
                    ELSE NULL
                END,
                updated_at = $2
            WHERE id = $1
            RETURNING locked_until
            "#,
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reset attempts", e))
    }

    /// Replaces the stored password hash.
    pub async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update password", e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        Ok(())
    }

    /// Marks the email address as confirmed.
    pub async fn confirm_email(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE users SET email_confirmed = TRUE, updated_at = $2 WHERE id = $1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to confirm email", e)
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        Ok(())
    }
}
