//! Authentication service tying credentials, sessions, and policies together.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use keyward_cache::CacheManager;
use keyward_core::config::AppConfig;
use keyward_core::error::AppError;
use keyward_core::traits::Clock;
use keyward_entity::principal::Principal;
use keyward_entity::user::{NewUser, User};

use crate::cookie::SessionCookie;
use crate::error::AuthError;
use crate::lockout::{LockoutPolicy, LockoutState};
use crate::notify::{EmailDispatcher, EmailSender};
use crate::password::{PasswordHasher, PasswordValidator};
use crate::policy::{Decision, PolicyEvaluator, PolicyRegistry};
use crate::principal::{PrincipalResolver, RoleClaimStore};
use crate::revocation::RevocationStore;
use crate::store::CredentialStore;
use crate::token::{SessionClaims, SessionDenylist, SessionTokenIssuer, SessionTokenValidator};

/// Registration input.
#[derive(Clone, Deserialize, Validate)]
pub struct NewAccount {
    /// Desired username.
    #[validate(length(min = 1, max = 64, message = "Username must be 1-64 characters"))]
    pub username: String,
    /// Email address.
    #[validate(email(message = "Email address is invalid"))]
    pub email: Option<String>,
    /// Plaintext password.
    pub password: String,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// A successful sign-in.
#[derive(Debug, Clone)]
pub struct SignIn {
    /// The signed-in user.
    pub user_id: Uuid,
    /// Compact session token.
    pub token: String,
    /// `Set-Cookie` value carrying the token.
    pub set_cookie: String,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
}

/// Authentication and authorization entry point.
///
/// Holds no per-request state; every component is shared and safe for
/// concurrent use.
#[derive(Debug, Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    principals: Arc<PrincipalResolver>,
    hasher: Arc<PasswordHasher>,
    password_validator: PasswordValidator,
    lockout: LockoutPolicy,
    issuer: SessionTokenIssuer,
    validator: SessionTokenValidator,
    denylist: Option<Arc<SessionDenylist>>,
    evaluator: PolicyEvaluator,
    notifier: EmailDispatcher,
    cookie: SessionCookie,
    clock: Arc<dyn Clock>,
    require_confirmed_email: bool,
}

impl AuthService {
    /// Builds the service and every component it owns from configuration.
    ///
    /// `cache` holds reloadable principals only; revocations live in
    /// `revocations`, which must be shared by every process that validates
    /// sessions.
    pub fn new(
        config: &AppConfig,
        credentials: Arc<dyn CredentialStore>,
        roles: Arc<dyn RoleClaimStore>,
        revocations: Arc<dyn RevocationStore>,
        cache: Arc<CacheManager>,
        email: Arc<dyn EmailSender>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let issuer = SessionTokenIssuer::new(&config.session, Arc::clone(&clock))?;
        let session_window = std::time::Duration::from_secs(config.session.ttl_hours * 3600);
        let principal_ttl =
            session_window.min(std::time::Duration::from_secs(config.cache.default_ttl_seconds));

        let denylist = config
            .session
            .denylist_enabled
            .then(|| Arc::new(SessionDenylist::new(revocations, issuer.ttl())));

        let registry = PolicyRegistry::from_config(&config.authorization)?;
        info!(policies = registry.len(), "Authorization policies loaded");

        Ok(Self {
            credentials,
            principals: Arc::new(PrincipalResolver::new(roles, cache, principal_ttl)),
            hasher: Arc::new(PasswordHasher::new(&config.auth.hashing)?),
            password_validator: PasswordValidator::new(&config.auth.password),
            lockout: LockoutPolicy::new(&config.auth.lockout),
            issuer,
            validator: SessionTokenValidator::new(
                &config.session,
                Arc::clone(&clock),
                denylist.clone(),
            ),
            denylist,
            evaluator: PolicyEvaluator::new(Arc::new(registry)),
            notifier: EmailDispatcher::new(&config.email, email),
            cookie: SessionCookie::new(&config.session),
            clock,
            require_confirmed_email: config.auth.require_confirmed_email,
        })
    }

    /// Role and claim administration.
    pub fn principals(&self) -> &PrincipalResolver {
        &self.principals
    }

    /// Registered policies.
    pub fn policies(&self) -> &PolicyRegistry {
        self.evaluator.registry()
    }

    /// Session cookie attributes.
    pub fn cookie(&self) -> &SessionCookie {
        &self.cookie
    }

    /// Creates an account after validating input and the password policy.
    pub async fn register(&self, account: NewAccount) -> Result<User, AuthError> {
        account
            .validate()
            .map_err(|e| AuthError::InvalidInput(e.to_string()))?;
        if account.username.contains('@') {
            return Err(AuthError::InvalidInput(
                "Username must not contain '@'".into(),
            ));
        }
        self.password_validator.validate(&account.password)?;

        let password_hash = self.hasher.hash_password(&account.password)?;
        let user = self
            .credentials
            .create_user(
                NewUser {
                    username: account.username,
                    email: account.email,
                    password_hash,
                    email_confirmed: false,
                },
                self.clock.now(),
            )
            .await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Verifies credentials and issues a session.
    pub async fn authenticate(&self, identifier: &str, password: &str) -> Result<SignIn, AuthError> {
        let now = self.clock.now();

        let Some(user) = self.credentials.find_by_identifier(identifier).await? else {
            self.hasher.verify_dummy(password);
            warn!(identifier = %identifier, "Sign-in failed: unknown identifier");
            return Err(AuthError::InvalidCredentials);
        };

        if let LockoutState::Locked { remaining, .. } = self.lockout.state(&user, now) {
            warn!(user_id = %user.id, remaining_secs = remaining.num_seconds(), "Sign-in refused: account locked");
            return Err(AuthError::AccountLocked { remaining });
        }

        if !self.hasher.verify_password(password, &user.password_hash)? {
            return Err(self.handle_failed_sign_in(&user, now).await);
        }

        if self.require_confirmed_email && !user.email_confirmed {
            warn!(user_id = %user.id, "Sign-in refused: email not confirmed");
            return Err(AuthError::EmailNotConfirmed);
        }

        // The row read above may be stale; the store re-checks the lock atomically.
        if let Some(until) = self.credentials.record_successful_attempt(user.id, now).await? {
            warn!(user_id = %user.id, locked_until = %until, "Sign-in refused: account locked meanwhile");
            return Err(AuthError::AccountLocked {
                remaining: until - now,
            });
        }

        let session = self.issuer.issue(user.id)?;
        info!(
            user_id = %user.id,
            session_id = %session.claims.sid,
            "User signed in"
        );

        Ok(SignIn {
            user_id: user.id,
            set_cookie: self.cookie.set_cookie(&session.token),
            expires_at: session.expires_at(),
            token: session.token,
        })
    }

    /// Records a failed attempt and picks the error to report.
    async fn handle_failed_sign_in(&self, user: &User, now: DateTime<Utc>) -> AuthError {
        let threshold = self.lockout.threshold(now);
        match self.credentials.record_failed_attempt(user.id, &threshold).await {
            Ok(attempt) if attempt.newly_locked => {
                let until = attempt.locked_until.unwrap_or(now + self.lockout.duration());
                warn!(user_id = %user.id, locked_until = %until, "Account locked after repeated failures");
                self.notifier.lockout_notice(user, until);
                AuthError::AccountLocked {
                    remaining: until - now,
                }
            }
            Ok(attempt) => {
                warn!(
                    user_id = %user.id,
                    failed_attempts = attempt.failed_attempts,
                    "Sign-in failed: wrong password"
                );
                AuthError::InvalidCredentials
            }
            Err(e) => e.into(),
        }
    }

    /// Validates a session token and resolves its principal.
    pub async fn validate_session(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self.validator.validate(token).await?;
        Ok(self.principals.resolve(claims.user_id()).await?)
    }

    /// Checks `policy` for the session holder.
    pub async fn authorize(&self, token: &str, policy: &str) -> Result<Decision, AuthError> {
        let principal = self.validate_session(token).await?;
        let decision = self.evaluator.evaluate(policy, &principal)?;

        match &decision {
            Decision::Allow => debug!(user_id = %principal.user_id, policy, "Access granted"),
            Decision::Deny(reason) => {
                warn!(user_id = %principal.user_id, policy, reason = %reason, "Access denied");
            }
        }
        Ok(decision)
    }

    /// Evaluates `policy` for an already-resolved principal.
    pub fn evaluate(&self, policy: &str, principal: &Principal) -> Result<Decision, AuthError> {
        self.evaluator.evaluate(policy, principal)
    }

    /// Ends the session. Returns the `Set-Cookie` value that clears it.
    pub async fn logout(&self, token: &str) -> Result<String, AuthError> {
        let claims = self.validator.validate(token).await?;

        match &self.denylist {
            Some(denylist) => denylist.revoke_session(&claims, self.clock.now()).await?,
            None => warn!(
                session_id = %claims.sid,
                "Denylist disabled; session stays valid until expiry"
            ),
        }

        info!(user_id = %claims.sub, session_id = %claims.sid, "User signed out");
        Ok(self.cookie.clear_cookie())
    }

    /// Changes the password of the session holder and revokes all their sessions.
    ///
    /// The caller signs in again with the new password.
    pub async fn change_password(
        &self,
        token: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let claims: SessionClaims = self.validator.validate(token).await?;
        let user = self
            .credentials
            .find_by_id(claims.user_id())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hasher.verify_password(current_password, &user.password_hash)? {
            warn!(user_id = %user.id, "Password change refused: wrong current password");
            return Err(AuthError::InvalidCredentials);
        }
        self.password_validator
            .validate_not_same(current_password, new_password)?;
        self.password_validator.validate(new_password)?;

        let now = self.clock.now();
        let password_hash = self.hasher.hash_password(new_password)?;
        self.credentials
            .update_password_hash(user.id, &password_hash, now)
            .await?;

        if let Some(denylist) = &self.denylist {
            denylist.revoke_user_sessions(user.id, now).await?;
        }
        self.notifier.password_changed_notice(&user);

        info!(user_id = %user.id, "Password changed");
        Ok(())
    }

    /// Sends a reset notice when the identifier names a user with an email address.
    ///
    /// Always succeeds so callers cannot learn which identifiers exist.
    pub async fn request_password_reset(&self, identifier: &str) -> Result<(), AuthError> {
        match self.credentials.find_by_identifier(identifier).await? {
            Some(user) => {
                self.notifier.password_reset_notice(&user);
                info!(user_id = %user.id, "Password reset requested");
            }
            None => debug!(identifier = %identifier, "Password reset for unknown identifier"),
        }
        Ok(())
    }

    /// Marks a user's email address as confirmed.
    pub async fn confirm_email(&self, user_id: Uuid) -> Result<(), AuthError> {
        self.credentials.confirm_email(user_id, self.clock.now()).await?;
        info!(user_id = %user_id, "Email confirmed");
        Ok(())
    }

    /// Drops revocations whose sessions have expired. Returns how many were removed.
    pub async fn purge_expired_revocations(&self) -> Result<u64, AuthError> {
        match &self.denylist {
            Some(denylist) => Ok(denylist.purge_expired(self.clock.now()).await?),
            None => Ok(0),
        }
    }

    /// Clears a user's lockout and failure counter.
    pub async fn unlock(&self, user_id: Uuid) -> Result<(), AuthError> {
        self.credentials.reset_attempts(user_id, self.clock.now()).await?;
        info!(user_id = %user_id, "Account unlocked");
        Ok(())
    }

    /// Finds a user by username or email.
    pub async fn find_user(&self, identifier: &str) -> Result<Option<User>, AuthError> {
        Ok(self.credentials.find_by_identifier(identifier).await?)
    }

    /// Every user.
    pub async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.credentials.list_users().await?)
    }
}
