//! Role management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use keyward_core::config::AppConfig;
use keyward_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for role commands
#[derive(Debug, Args)]
pub struct RoleArgs {
    /// Role subcommand
    #[command(subcommand)]
    pub command: RoleCommand,
}

/// Role subcommands
#[derive(Debug, Subcommand)]
pub enum RoleCommand {
    /// Define a new role
    Create {
        /// Role name (case-sensitive)
        name: String,
    },
    /// List all roles
    List,
    /// Assign a role to a user
    Assign {
        /// Username or email
        identifier: String,
        /// Role name
        role: String,
    },
    /// Remove a role from a user
    Revoke {
        /// Username or email
        identifier: String,
        /// Role name
        role: String,
    },
}

/// Role display row
#[derive(Debug, Serialize, Tabled)]
struct RoleRow {
    /// Role ID
    id: String,
    /// Role name
    name: String,
}

/// Execute role commands
pub async fn execute(args: &RoleArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let service = super::build_service(config).await?;
    let principals = service.principals();

    match &args.command {
        RoleCommand::Create { name } => {
            let role = principals.create_role(name).await?;
            output::print_success(&format!("Role '{}' created (id: {})", role.name, role.id));
        }
        RoleCommand::List => {
            let roles = principals.list_roles().await?;
            let rows: Vec<RoleRow> = roles
                .iter()
                .map(|r| RoleRow {
                    id: r.id.to_string(),
                    name: r.name.clone(),
                })
                .collect();
            output::print_list(&rows, format);
        }
        RoleCommand::Assign { identifier, role } => {
            let user = super::require_user(&service, identifier).await?;
            principals.assign_role(user.id, role).await?;
            output::print_success(&format!("Role '{role}' assigned to '{}'", user.username));
        }
        RoleCommand::Revoke { identifier, role } => {
            let user = super::require_user(&service, identifier).await?;
            if principals.revoke_role(user.id, role).await? {
                output::print_success(&format!("Role '{role}' revoked from '{}'", user.username));
            } else {
                output::print_warning(&format!("'{}' did not have role '{role}'", user.username));
            }
        }
    }

    Ok(())
}
