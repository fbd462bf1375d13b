//! Session CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use keyward_auth::Decision;
use keyward_core::config::AppConfig;
use keyward_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Sign in and print the session token
    SignIn {
        /// Username or email
        identifier: String,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Check a policy for the holder of a session token
    Authorize {
        /// Session token
        #[arg(short, long)]
        token: String,
        /// Policy name
        policy: String,
    },
    /// Revoke a session token
    Logout {
        /// Session token
        #[arg(short, long)]
        token: String,
    },
    /// Change the password of the session holder; ends all their sessions
    ChangePassword {
        /// Session token
        #[arg(short, long)]
        token: String,
    },
    /// Request a password reset notice
    ResetPassword {
        /// Username or email
        identifier: String,
    },
    /// Delete revocations whose sessions have expired
    Purge,
}

/// Sign-in display row
#[derive(Debug, Serialize, Tabled)]
struct SignInRow {
    /// User ID
    user_id: String,
    /// Expires at
    expires_at: String,
    /// Session token
    token: String,
}

/// Execute session commands
pub async fn execute(args: &SessionArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let service = super::build_service(config).await?;

    match &args.command {
        SessionCommand::SignIn {
            identifier,
            password,
        } => {
            let password = super::prompt_password(password, "Password", false)?;
            let sign_in = service.authenticate(identifier, &password).await?;

            let row = SignInRow {
                user_id: sign_in.user_id.to_string(),
                expires_at: sign_in.expires_at.to_rfc3339(),
                token: sign_in.token,
            };
            output::print_item(&row, format);
        }
        SessionCommand::Authorize { token, policy } => match service.authorize(token, policy).await? {
            Decision::Allow => output::print_success(&format!("Allowed by '{policy}'")),
            Decision::Deny(reason) => {
                output::print_warning(&format!("Denied by '{policy}': {reason}"));
            }
        },
        SessionCommand::Logout { token } => {
            service.logout(token).await?;
            if config.session.denylist_enabled {
                output::print_success("Session revoked");
            } else {
                output::print_warning("Denylist disabled; the token stays valid until it expires");
            }
        }
        SessionCommand::ChangePassword { token } => {
            let current = super::prompt_password(&None, "Current password", false)?;
            let new = super::prompt_password(&None, "New password", true)?;
            service.change_password(token, &current, &new).await?;
            output::print_success("Password changed; sign in again");
        }
        SessionCommand::ResetPassword { identifier } => {
            service.request_password_reset(identifier).await?;
            output::print_success("If the account exists, a notice has been sent");
        }
        SessionCommand::Purge => {
            let removed = service.purge_expired_revocations().await?;
            output::print_success(&format!("Purged {removed} expired revocation(s)"));
        }
    }

    Ok(())
}
