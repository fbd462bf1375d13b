//! Authorization policy CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use keyward_auth::policy::PolicyRegistry;
use keyward_auth::Decision;
use keyward_core::config::AppConfig;
use keyward_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for policy commands
#[derive(Debug, Args)]
pub struct PolicyArgs {
    /// Policy subcommand
    #[command(subcommand)]
    pub command: PolicyCommand,
}

/// Policy subcommands
#[derive(Debug, Subcommand)]
pub enum PolicyCommand {
    /// List configured policies
    List,
    /// Evaluate a policy for a user
    Check {
        /// Username or email
        identifier: String,
        /// Policy name
        policy: String,
    },
}

/// Policy display row
#[derive(Debug, Serialize, Tabled)]
struct PolicyRow {
    /// Policy name
    name: String,
    /// Required roles
    roles: String,
    /// Required claims
    claims: String,
}

/// Decision display row
#[derive(Debug, Serialize, Tabled)]
struct DecisionRow {
    /// User
    user: String,
    /// Policy name
    policy: String,
    /// Allowed
    allowed: bool,
    /// Reason for denial
    reason: String,
}

/// Execute policy commands
pub async fn execute(args: &PolicyArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        PolicyCommand::List => {
            let registry = PolicyRegistry::from_config(&config.authorization)?;
            let rows: Vec<PolicyRow> = registry
                .definitions()
                .into_iter()
                .map(|p| PolicyRow {
                    name: p.name.clone(),
                    roles: p.required_roles.join(", "),
                    claims: p
                        .required_claims
                        .iter()
                        .map(|c| format!("{}={}", c.claim_type, c.value))
                        .collect::<Vec<_>>()
                        .join(", "),
                })
                .collect();
            output::print_list(&rows, format);
        }
        PolicyCommand::Check { identifier, policy } => {
            let service = super::build_service(config).await?;
            let user = super::require_user(&service, identifier).await?;
            let principal = service.principals().resolve(user.id).await?;
            let decision = service.evaluate(policy, &principal)?;

            let row = DecisionRow {
                user: user.username,
                policy: policy.clone(),
                allowed: decision.is_allowed(),
                reason: match decision {
                    Decision::Allow => String::new(),
                    Decision::Deny(reason) => reason.to_string(),
                },
            };
            output::print_item(&row, format);
        }
    }

    Ok(())
}
