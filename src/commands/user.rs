//! User management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use mrbs_core::config::AppConfig;
use mrbs_core::error::AppError;
use mrbs_database::UserRepository;
use mrbs_entity::user::{CreateUser, PrivilegeLevel};

use super::Engine;
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
    /// List all users
    List,
    /// Register a user
    Add {
        /// Login name
        name: String,
        /// Display name (defaults to the login name)
        #[arg(short, long)]
        display_name: Option<String>,
        /// Privilege tier: standard or privileged
        #[arg(short, long, default_value = "standard")]
        level: PrivilegeLevel,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    /// User ID
    id: String,
    /// Login name
    name: String,
    /// Display name
    display_name: String,
    /// Privilege tier
    level: String,
    /// Last booking activity
    last_active: String,
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let engine = Engine::open(config).await?;
    let result = run(&args.command, engine.users(), config, format).await;
    engine.close().await;
    result
}

async fn run(
    command: &UserCommand,
    users: &UserRepository,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let offset = config.booking.policy()?.offset();

    match command {
        UserCommand::List => {
            let rows: Vec<UserRow> = users
                .find_all()
                .await?
                .iter()
                .map(|u| UserRow {
                    id: u.id.to_string(),
                    name: u.name.clone(),
                    display_name: u.display_name.clone(),
                    level: u.privilege().to_string(),
                    last_active: u
                        .last_active_at
                        .map(|t| mrbs_core::types::time::format_datetime(t, offset))
                        .unwrap_or_else(|| "-".to_string()),
                })
                .collect();

            output::print_list(&rows, format);
        }
        UserCommand::Add {
            name,
            display_name,
            level,
        } => {
            let user = users
                .create(&CreateUser {
                    name: name.clone(),
                    display_name: display_name.clone().unwrap_or_else(|| name.clone()),
                    privilege: *level,
                })
                .await?;

            output::print_outcome(
                &user,
                &format!("User '{}' created as {}", user.name, user.privilege()),
                format,
            );
        }
    }
    Ok(())
}
