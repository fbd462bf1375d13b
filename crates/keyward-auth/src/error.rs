//! Typed authentication and authorization failures.

use chrono::Duration;
use thiserror::Error;

use keyward_core::config::SessionConfig;
use keyward_core::error::{AppError, ErrorKind};

/// Failures surfaced by the authentication core.
///
/// Credential failures collapse into [`AuthError::InvalidCredentials`] so the
/// caller cannot tell an unknown identifier from a wrong password. Token and
/// policy failures stay distinct so the boundary can map them separately.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown identifier or wrong password.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Too many failed attempts; sign-in refused until the lock elapses.
    #[error("Account is locked. Try again in {} seconds", .remaining.num_seconds().max(1))]
    AccountLocked {
        /// Time left on the lock.
        remaining: Duration,
    },

    /// Sign-in requires a confirmed email address.
    #[error("Email address has not been confirmed")]
    EmailNotConfirmed,

    /// The session token is past its expiry.
    #[error("Session has expired")]
    Expired,

    /// The session token failed signature or structure verification.
    #[error("Session token is invalid")]
    TamperedToken,

    /// The session was revoked by logout or a password change.
    #[error("Session has been revoked")]
    Revoked,

    /// The requested policy is not registered.
    #[error("Unknown authorization policy '{0}'")]
    UnknownPolicy(String),

    /// A new password does not satisfy the password policy.
    #[error("{0}")]
    WeakPassword(String),

    /// Request input failed validation.
    #[error("{0}")]
    InvalidInput(String),

    /// A uniqueness constraint was violated.
    #[error("{0}")]
    Conflict(String),

    /// Infrastructure failure (store, cache, signing).
    #[error(transparent)]
    Internal(AppError),
}

impl AuthError {
    /// The shared error category for this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCredentials | Self::Expired | Self::TamperedToken | Self::Revoked => {
                ErrorKind::Authentication
            }
            Self::AccountLocked { .. } => ErrorKind::Locked,
            Self::EmailNotConfirmed => ErrorKind::Authorization,
            Self::UnknownPolicy(_) => ErrorKind::Configuration,
            Self::WeakPassword(_) | Self::InvalidInput(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Internal(e) => e.kind,
        }
    }

    /// HTTP-equivalent status code a boundary layer should answer with.
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Whether the client must sign in again.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, Self::Expired | Self::TamperedToken | Self::Revoked)
    }

    /// Page a cookie-based boundary should redirect to, if any.
    pub fn redirect_path<'a>(&self, config: &'a SessionConfig) -> Option<&'a str> {
        if self.requires_reauthentication() {
            Some(config.login_path.as_str())
        } else {
            None
        }
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind {
            ErrorKind::Conflict => Self::Conflict(err.message),
            ErrorKind::Validation => Self::InvalidInput(err.message),
            _ => Self::Internal(err),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Internal(inner) => inner,
            other => AppError::new(other.kind(), other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::InvalidCredentials.status_code(), 401);
        assert_eq!(
            AuthError::AccountLocked {
                remaining: Duration::minutes(10)
            }
            .status_code(),
            423
        );
        assert_eq!(AuthError::TamperedToken.status_code(), 401);
        assert_eq!(AuthError::UnknownPolicy("X".into()).status_code(), 500);
        assert_eq!(AuthError::WeakPassword("short".into()).status_code(), 422);
    }

    #[test]
    fn test_locked_message_includes_remaining() {
        let err = AuthError::AccountLocked {
            remaining: Duration::seconds(90),
        };
        assert_eq!(err.to_string(), "Account is locked. Try again in 90 seconds");
    }

    #[test]
    fn test_app_error_conversions() {
        let conflict: AuthError = AppError::conflict("taken").into();
        assert!(matches!(conflict, AuthError::Conflict(ref m) if m == "taken"));

        let db: AuthError = AppError::database("down").into();
        assert_eq!(db.kind(), ErrorKind::Database);

        let back: AppError = AuthError::Expired.into();
        assert_eq!(back.kind, ErrorKind::Authentication);
        assert_eq!(back.message, "Session has expired");
    }

    #[test]
    fn test_redirects() {
        let config = SessionConfig::default();
        assert_eq!(
            AuthError::Expired.redirect_path(&config),
            Some("/Identity/Signin")
        );
        assert_eq!(AuthError::UnknownPolicy("X".into()).redirect_path(&config), None);
    }
}
