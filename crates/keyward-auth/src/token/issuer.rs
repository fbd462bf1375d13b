//! Session token issuance.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use tracing::warn;
use uuid::Uuid;

use keyward_core::config::SessionConfig;
use keyward_core::error::AppError;
use keyward_core::traits::Clock;

use super::claims::SessionClaims;

/// Secret shipped in the default configuration.
pub(crate) const PLACEHOLDER_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// A freshly signed session.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// Compact JWT.
    pub token: String,
    /// The signed claims.
    pub claims: SessionClaims,
}

impl IssuedSession {
    /// When the session expires.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at()
    }
}

/// Signs session tokens with the configured HMAC secret.
#[derive(Clone)]
pub struct SessionTokenIssuer {
    encoding_key: EncodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenIssuer")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionTokenIssuer {
    /// Creates an issuer from session configuration.
    pub fn new(config: &SessionConfig, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        if config.secret.is_empty() {
            return Err(AppError::configuration("Session secret must not be empty"));
        }
        if config.secret == PLACEHOLDER_SECRET || config.secret.len() < 32 {
            warn!("Session secret is the placeholder or shorter than 32 bytes; set session.secret");
        }
        if config.ttl_hours == 0 {
            return Err(AppError::configuration("Session ttl_hours must be positive"));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            ttl: Duration::hours(config.ttl_hours as i64),
            clock,
        })
    }

    /// Session lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a new session for `user_id` starting now.
    pub fn issue(&self, user_id: Uuid) -> Result<IssuedSession, AppError> {
        let claims = SessionClaims::new(user_id, self.clock.now(), self.ttl);

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign session token: {e}")))?;

        Ok(IssuedSession { token, claims })
    }
}
