//! Lockout state machine.
//!
//! A user is either open (accepting attempts, with a running failure count)
//! or locked until a fixed instant. Reaching the configured number of
//! consecutive failures locks the user and resets the count; the lock lapses
//! on its own once the clock passes the stored instant.

use chrono::{DateTime, Duration, SubsecRound, Utc};

use keyward_core::config::LockoutConfig;
use keyward_entity::user::User;

/// Lockout state of a user at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutState {
    /// Sign-in attempts are accepted.
    Open {
        /// Consecutive failures so far.
        failed_attempts: u32,
    },
    /// Sign-in attempts are refused.
    Locked {
        /// When the lock lapses.
        until: DateTime<Utc>,
        /// Time left on the lock.
        remaining: Duration,
    },
}

/// Parameters for one atomic failed-attempt update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureThreshold {
    /// Instant of the failed attempt.
    pub now: DateTime<Utc>,
    /// Count at which the user locks.
    pub max_attempts: u32,
    /// Lock expiry to apply when the count is reached, `None` when lockout is disabled.
    pub lock_until: Option<DateTime<Utc>>,
}

/// Outcome of recording a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailedAttempt {
    /// Counter after the update.
    pub failed_attempts: u32,
    /// Lock expiry after the update.
    pub locked_until: Option<DateTime<Utc>>,
    /// Whether this attempt is the one that locked the user.
    pub newly_locked: bool,
}

impl FailureThreshold {
    /// Applies this attempt to an in-memory user row.
    pub fn apply(&self, user: &mut User) -> FailedAttempt {
        if user.is_locked_at(self.now) {
            return FailedAttempt {
                failed_attempts: user.failed_attempts.max(0) as u32,
                locked_until: user.locked_until,
                newly_locked: false,
            };
        }

        let count = user.failed_attempts.max(0) as u32 + 1;
        let newly_locked = match self.lock_until {
            Some(until) if count >= self.max_attempts => {
                user.failed_attempts = 0;
                user.locked_until = Some(until);
                true
            }
            _ => {
                user.failed_attempts = count as i32;
                false
            }
        };
        user.updated_at = self.now;

        FailedAttempt {
            failed_attempts: user.failed_attempts as u32,
            locked_until: user.locked_until,
            newly_locked,
        }
    }
}

/// Lockout rules derived from configuration.
#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    enabled: bool,
    max_failed_attempts: u32,
    duration: Duration,
}

impl LockoutPolicy {
    /// Creates the policy from configuration.
    pub fn new(config: &LockoutConfig) -> Self {
        Self {
            enabled: config.enabled,
            max_failed_attempts: config.max_failed_attempts.max(1),
            duration: Duration::minutes(config.duration_minutes as i64),
        }
    }

    /// How long a lock lasts.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Lockout state of `user` at `now`.
    pub fn state(&self, user: &User, now: DateTime<Utc>) -> LockoutState {
        match (user.locked_until, user.lockout_remaining(now)) {
            (Some(until), Some(remaining)) => LockoutState::Locked { until, remaining },
            _ => LockoutState::Open {
                failed_attempts: user.failed_attempts.max(0) as u32,
            },
        }
    }

    /// Threshold for a failed attempt made at `now`.
    ///
    /// The lock instant is truncated to microseconds so it survives a
    /// round-trip through Postgres `timestamptz` unchanged.
    pub fn threshold(&self, now: DateTime<Utc>) -> FailureThreshold {
        FailureThreshold {
            now,
            max_attempts: self.max_failed_attempts,
            lock_until: self
                .enabled
                .then(|| (now + self.duration).trunc_subsecs(6)),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use keyward_entity::user::NewUser;

    use super::*;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn user() -> User {
        NewUser {
            username: "alice".into(),
            email: None,
            password_hash: String::new(),
            email_confirmed: true,
        }
        .into_user(start())
    }

    fn policy() -> LockoutPolicy {
        LockoutPolicy::new(&LockoutConfig {
            enabled: true,
            max_failed_attempts: 3,
            duration_minutes: 10,
        })
    }

    #[test]
    fn test_locks_on_third_failure() {
        let policy = policy();
        let mut user = user();
        let now = start();

        assert!(!policy.threshold(now).apply(&mut user).newly_locked);
        assert!(!policy.threshold(now).apply(&mut user).newly_locked);
        assert_eq!(user.failed_attempts, 2);

        let third = policy.threshold(now).apply(&mut user);
        assert!(third.newly_locked);
        assert_eq!(third.failed_attempts, 0);
        assert_eq!(third.locked_until, Some(now + Duration::minutes(10)));

        match policy.state(&user, now + Duration::minutes(4)) {
            LockoutState::Locked { remaining, .. } => {
                assert_eq!(remaining, Duration::minutes(6));
            }
            other => panic!("expected locked, got {other:?}"),
        }
    }

    #[test]
    fn test_locked_user_not_counted() {
        let policy = policy();
        let mut user = user();
        let now = start();
        for _ in 0..3 {
            policy.threshold(now).apply(&mut user);
        }

        let later = now + Duration::minutes(1);
        let attempt = policy.threshold(later).apply(&mut user);
        assert!(!attempt.newly_locked);
        assert_eq!(attempt.failed_attempts, 0);
        assert_eq!(attempt.locked_until, Some(now + Duration::minutes(10)));
    }

    #[test]
    fn test_lock_lapses() {
        let policy = policy();
        let mut user = user();
        let now = start();
        for _ in 0..3 {
            policy.threshold(now).apply(&mut user);
        }

        let after = now + Duration::minutes(10);
        assert_eq!(
            policy.state(&user, after),
            LockoutState::Open { failed_attempts: 0 }
        );

        let attempt = policy.threshold(after).apply(&mut user);
        assert_eq!(attempt.failed_attempts, 1);
        assert!(!attempt.newly_locked);
    }

    #[test]
    fn test_disabled_lockout_only_counts() {
        let policy = LockoutPolicy::new(&LockoutConfig {
            enabled: false,
            max_failed_attempts: 3,
            duration_minutes: 10,
        });
        let mut user = user();
        for _ in 0..5 {
            policy.threshold(start()).apply(&mut user);
        }
        assert_eq!(user.failed_attempts, 5);
        assert!(user.locked_until.is_none());
    }
}
