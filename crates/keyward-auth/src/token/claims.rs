//! Session token claims.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims payload embedded in every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the user ID.
    pub sub: Uuid,
    /// Session ID, used for logout revocation.
    pub sid: Uuid,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp in milliseconds, compared against password-change cutoffs.
    pub iat_ms: i64,
}

impl SessionClaims {
    /// Builds claims for a session issued at `now` and lasting at least `ttl`.
    ///
    /// `exp` has whole-second precision, so it is rounded up rather than
    /// cutting the session short.
    pub fn new(user_id: Uuid, now: DateTime<Utc>, ttl: Duration) -> Self {
        let expires = now + ttl;
        let exp = expires.timestamp() + i64::from(expires.timestamp_subsec_nanos() > 0);

        Self {
            sub: user_id,
            sid: Uuid::new_v4(),
            iat: now.timestamp(),
            exp,
            iat_ms: now.timestamp_millis(),
        }
    }

    /// Returns the user ID from the subject claim.
    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the session ID.
    pub fn session_id(&self) -> Uuid {
        self.sid
    }

    /// Returns the issue instant.
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.iat_ms).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Checks whether this token has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at() - now).max(Duration::zero())
    }
}
