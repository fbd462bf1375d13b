//! CLI command definitions and dispatch.

pub mod claim;
pub mod migrate;
pub mod policy;
pub mod role;
pub mod session;
pub mod user;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use keyward_auth::notify::LogEmailSender;
use keyward_auth::principal::PgRoleClaimStore;
use keyward_auth::revocation::PgRevocationStore;
use keyward_auth::store::PgCredentialStore;
use keyward_auth::AuthService;
use keyward_cache::CacheManager;
use keyward_core::config::AppConfig;
use keyward_core::error::AppError;
use keyward_core::traits::SystemClock;
use keyward_database::DatabasePool;
use keyward_entity::user::User;

use crate::output::OutputFormat;

/// Keyward: cookie-session authentication and claims-based authorization
#[derive(Debug, Parser)]
#[command(name = "keyward", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// User management
    User(user::UserArgs),
    /// Role management
    Role(role::RoleArgs),
    /// Claim management
    Claim(claim::ClaimArgs),
    /// Authorization policies
    Policy(policy::PolicyArgs),
    /// Sign in, check, and end sessions
    Session(session::SessionArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::User(args) => user::execute(args, &config, self.format).await,
            Commands::Role(args) => role::execute(args, &config, self.format).await,
            Commands::Claim(args) => claim::execute(args, &config).await,
            Commands::Policy(args) => policy::execute(args, &config, self.format).await,
            Commands::Session(args) => session::execute(args, &config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// Helper: connect to the database
pub async fn connect(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Helper: build the auth service over the Postgres stores
///
/// Revocations go to the database so every later invocation honours them.
pub async fn build_service(config: &AppConfig) -> Result<AuthService, AppError> {
    let pool = connect(config).await?.into_pool();
    let cache = Arc::new(CacheManager::new(&config.cache)?);

    AuthService::new(
        config,
        Arc::new(PgCredentialStore::new(pool.clone())),
        Arc::new(PgRoleClaimStore::new(pool.clone())),
        Arc::new(PgRevocationStore::new(pool)),
        cache,
        Arc::new(LogEmailSender),
        Arc::new(SystemClock),
    )
}

/// Helper: find a user by username or email, failing when absent
pub async fn require_user(service: &AuthService, identifier: &str) -> Result<User, AppError> {
    service
        .find_user(identifier)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User '{identifier}' not found")))
}

/// Helper: prompt for a value when it was not given on the command line
pub fn prompt_password(given: &Option<String>, prompt: &str, confirm: bool) -> Result<String, AppError> {
    if let Some(password) = given {
        return Ok(password.clone());
    }

    let mut input = dialoguer::Password::new().with_prompt(prompt);
    if confirm {
        input = input.with_confirmation("Confirm password", "Passwords do not match");
    }
    input
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}
