//! Claim management CLI commands.

use clap::{Args, Subcommand};

use keyward_core::config::AppConfig;
use keyward_core::error::AppError;
use keyward_entity::claim::Claim;

use crate::output;

/// Arguments for claim commands
#[derive(Debug, Args)]
pub struct ClaimArgs {
    /// Claim subcommand
    #[command(subcommand)]
    pub command: ClaimCommand,
}

/// Claim subcommands
#[derive(Debug, Subcommand)]
pub enum ClaimCommand {
    /// Attach a claim to a user
    Add {
        /// Username or email
        identifier: String,
        /// Claim as `Type=Value`
        claim: Claim,
    },
    /// Detach a claim from a user
    Remove {
        /// Username or email
        identifier: String,
        /// Claim as `Type=Value`
        claim: Claim,
    },
}

/// Execute claim commands
pub async fn execute(args: &ClaimArgs, config: &AppConfig) -> Result<(), AppError> {
    let service = super::build_service(config).await?;
    let principals = service.principals();

    match &args.command {
        ClaimCommand::Add { identifier, claim } => {
            let user = super::require_user(&service, identifier).await?;
            principals.add_claim(user.id, claim).await?;
            output::print_success(&format!("Claim '{claim}' added to '{}'", user.username));
        }
        ClaimCommand::Remove { identifier, claim } => {
            let user = super::require_user(&service, identifier).await?;
            if principals.remove_claim(user.id, claim).await? {
                output::print_success(&format!("Claim '{claim}' removed from '{}'", user.username));
            } else {
                output::print_warning(&format!("'{}' did not hold claim '{claim}'", user.username));
            }
        }
    }

    Ok(())
}
