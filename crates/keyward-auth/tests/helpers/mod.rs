//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use keyward_auth::notify::MemoryEmailSender;
use keyward_auth::principal::MemoryRoleClaimStore;
use keyward_auth::revocation::MemoryRevocationStore;
use keyward_auth::store::{CredentialStore, MemoryCredentialStore};
use keyward_auth::{AuthService, NewAccount};
use keyward_cache::CacheManager;
use keyward_core::config::AppConfig;
use keyward_core::traits::ManualClock;
use keyward_entity::claim::Claim;
use keyward_entity::user::User;

/// Test application context
pub struct TestApp {
    /// The service under test
    pub service: AuthService,
    /// Clock driving lockout and expiry
    pub clock: ManualClock,
    /// Credential store behind the service
    pub credentials: Arc<MemoryCredentialStore>,
    /// Revocations written by logout and password change
    pub revocations: Arc<MemoryRevocationStore>,
    /// Outbox of every email notice
    pub outbox: MemoryEmailSender,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a test application from the fixture config
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application from `config`
    pub fn with_config(config: AppConfig) -> Self {
        let credentials = Arc::new(MemoryCredentialStore::new());
        Self::with_stores(config, credentials.clone(), credentials)
    }

    /// Create a test application whose service reads credentials through
    /// `store`, which wraps `credentials`
    pub fn with_stores(
        config: AppConfig,
        credentials: Arc<MemoryCredentialStore>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap());
        let revocations = Arc::new(MemoryRevocationStore::new());
        let roles = Arc::new(MemoryRoleClaimStore::new());
        let cache = Arc::new(CacheManager::new(&config.cache).expect("Failed to init cache"));
        let outbox = MemoryEmailSender::new();

        let service = AuthService::new(
            &config,
            store,
            roles,
            revocations.clone(),
            cache,
            Arc::new(outbox.clone()),
            Arc::new(clock.clone()),
        )
        .expect("Failed to build auth service");

        Self {
            service,
            clock,
            credentials,
            revocations,
            outbox,
            config,
        }
    }

    /// Register a user with a confirmed email address
    pub async fn create_test_user(&self, username: &str, password: &str) -> User {
        let user = self
            .service
            .register(NewAccount {
                username: username.to_string(),
                email: Some(format!("{username}@example.com")),
                password: password.to_string(),
            })
            .await
            .expect("Failed to register test user");
        self.service
            .confirm_email(user.id)
            .await
            .expect("Failed to confirm email");
        user
    }

    /// Grant `role` and `Department=department` to a user
    pub async fn grant(&self, user: &User, role: &str, department: &str) {
        let principals = self.service.principals();
        // Conflicts when an earlier call already defined the role.
        let _ = principals.create_role(role).await;
        principals
            .assign_role(user.id, role)
            .await
            .expect("Failed to assign role");
        principals
            .add_claim(user.id, &Claim::new("Department", department))
            .await
            .expect("Failed to add claim");
    }

    /// Sign in and return the session token
    pub async fn sign_in(&self, username: &str, password: &str) -> String {
        self.service
            .authenticate(username, password)
            .await
            .expect("Sign-in failed")
            .token
    }

    /// Let spawned email tasks run
    pub async fn flush_email(&self) {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
}

/// The fixture configuration
pub fn test_config() -> AppConfig {
    AppConfig::from_toml(include_str!("../fixtures/test_config.toml"))
        .expect("Failed to load test config")
}
