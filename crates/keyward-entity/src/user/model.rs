//! User entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name (case-insensitive).
    pub username: String,
    /// Email address, unique when present (case-insensitive).
    pub email: Option<String>,
    /// Argon2id PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Consecutive failed sign-in attempts since the last success or lockout.
    pub failed_attempts: i32,
    /// Sign-in is refused until this instant.
    pub locked_until: Option<DateTime<Utc>>,
    /// Whether the email address has been confirmed.
    pub email_confirmed: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if the account is locked at `now`.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    /// Time left on the current lockout, if any.
    pub fn lockout_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.locked_until
            .filter(|until| now < *until)
            .map(|until| until - now)
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Desired username.
    pub username: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Whether the email address is already confirmed.
    pub email_confirmed: bool,
}

impl NewUser {
    /// Materializes the row this data describes, stamped at `now`.
    pub fn into_user(self, now: DateTime<Utc>) -> User {
        User {
            id: Uuid::new_v4(),
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            failed_attempts: 0,
            locked_until: None,
            email_confirmed: self.email_confirmed,
            created_at: now,
            updated_at: now,
        }
    }
}
