//! User management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use keyward_auth::NewAccount;
use keyward_core::config::AppConfig;
use keyward_core::error::AppError;
use keyward_entity::user::User;

use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Register a new user
    Create {
        /// Username
        #[arg(short, long)]
        username: Option<String>,
        /// Email
        #[arg(short, long)]
        email: Option<String>,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
        /// Mark the email address as confirmed
        #[arg(long)]
        confirmed: bool,
    },
    /// List all users
    List,
    /// Show a user's roles and claims
    Show {
        /// Username or email
        identifier: String,
    },
    /// Mark a user's email address as confirmed
    Confirm {
        /// Username or email
        identifier: String,
    },
    /// Clear a user's lockout
    Unlock {
        /// Username or email
        identifier: String,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    /// User ID
    id: String,
    /// Username
    username: String,
    /// Email
    email: String,
    /// Email confirmed
    confirmed: bool,
    /// Failed attempts
    failed_attempts: i32,
    /// Locked until
    locked_until: String,
    /// Created at
    created_at: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.to_string(),
            username: u.username.clone(),
            email: u.email.clone().unwrap_or_default(),
            confirmed: u.email_confirmed,
            failed_attempts: u.failed_attempts,
            locked_until: u
                .locked_until
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            created_at: u.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Principal display row
#[derive(Debug, Serialize, Tabled)]
struct PrincipalRow {
    /// User ID
    user_id: String,
    /// Assigned roles
    roles: String,
    /// Held claims
    claims: String,
}

/// Execute user commands
pub async fn execute(args: &UserArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let service = super::build_service(config).await?;

    match &args.command {
        UserCommand::Create {
            username,
            email,
            password,
            confirmed,
        } => {
            let username = match username {
                Some(u) => u.clone(),
                None => dialoguer::Input::new()
                    .with_prompt("Username")
                    .interact_text()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?,
            };

            let email = match email {
                Some(e) => Some(e.clone()),
                None => {
                    let e: String = dialoguer::Input::new()
                        .with_prompt("Email (optional, press Enter to skip)")
                        .allow_empty(true)
                        .interact_text()
                        .map_err(|e| AppError::internal(format!("Input error: {e}")))?;
                    if e.is_empty() { None } else { Some(e) }
                }
            };

            let password = super::prompt_password(password, "Password", true)?;

            let user = service
                .register(NewAccount {
                    username,
                    email,
                    password,
                })
                .await?;

            if *confirmed {
                service.confirm_email(user.id).await?;
            }

            output::print_success(&format!(
                "User '{}' created (id: {})",
                user.username, user.id
            ));
        }
        UserCommand::List => {
            let users = service.list_users().await?;
            let rows: Vec<UserRow> = users.iter().map(UserRow::from).collect();
            output::print_list(&rows, format);
        }
        UserCommand::Show { identifier } => {
            let user = super::require_user(&service, identifier).await?;
            let principal = service.principals().resolve(user.id).await?;

            let row = PrincipalRow {
                user_id: principal.user_id.to_string(),
                roles: principal.roles.iter().cloned().collect::<Vec<_>>().join(", "),
                claims: principal
                    .claims
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            };
            output::print_item(&row, format);
        }
        UserCommand::Confirm { identifier } => {
            let user = super::require_user(&service, identifier).await?;
            service.confirm_email(user.id).await?;
            output::print_success(&format!("Email confirmed for '{}'", user.username));
        }
        UserCommand::Unlock { identifier } => {
            let user = super::require_user(&service, identifier).await?;
            service.unlock(user.id).await?;
            output::print_success(&format!("User '{}' unlocked", user.username));
        }
    }

    Ok(())
}
