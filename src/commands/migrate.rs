//! Database migration commands.

use clap::{Args, Subcommand};

use keyward_core::config::AppConfig;
use keyward_core::error::AppError;
use keyward_database::migration::run_migrations;

use crate::output;

/// Arguments for migrate commands
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migrate subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migrate subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Apply all pending migrations
    Run,
    /// Check database connectivity
    Check,
}

/// Execute migrate commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    let db = super::connect(config).await?;

    match &args.command {
        MigrateCommand::Run => {
            run_migrations(db.pool()).await?;
            output::print_success("Migrations applied");
        }
        MigrateCommand::Check => {
            if db.health_check().await? {
                output::print_success("Database reachable");
            } else {
                output::print_warning("Database health check failed");
            }
        }
    }

    db.close().await;
    Ok(())
}
