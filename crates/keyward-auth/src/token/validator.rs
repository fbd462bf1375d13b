//! Session token validation.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use keyward_core::config::SessionConfig;
use keyward_core::traits::Clock;

use super::claims::SessionClaims;
use super::denylist::SessionDenylist;
use crate::error::AuthError;

/// Verifies session tokens.
#[derive(Clone)]
pub struct SessionTokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
    denylist: Option<Arc<SessionDenylist>>,
}

impl std::fmt::Debug for SessionTokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenValidator")
            .field("validation", &self.validation)
            .field("denylist", &self.denylist.is_some())
            .finish()
    }
}

impl SessionTokenValidator {
    /// Creates a validator. Revocation is only checked when `denylist` is set.
    pub fn new(
        config: &SessionConfig,
        clock: Arc<dyn Clock>,
        denylist: Option<Arc<SessionDenylist>>,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock instead.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            clock,
            denylist,
        }
    }

    /// Validates a session token.
    ///
    /// Checks, in order:
    /// 1. Signature and structure
    /// 2. Expiry
    /// 3. Revocation
    pub async fn validate(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let claims = self.verify(token)?;
        let now = self.clock.now();

        if claims.is_expired_at(now) {
            return Err(AuthError::Expired);
        }

        if let Some(denylist) = &self.denylist {
            if denylist.is_revoked(&claims, now).await? {
                return Err(AuthError::Revoked);
            }
        }

        Ok(claims)
    }

    /// Signature and structure check only.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Session token rejected");
                AuthError::TamperedToken
            })
    }
}
