//! CLI command definitions and dispatch.

pub mod booking;
pub mod migrate;
pub mod rooms;
pub mod user;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use mrbs_core::config::AppConfig;
use mrbs_core::error::AppError;
use mrbs_database::{BookingRepository, DatabasePool, UserRepository};
use mrbs_entity::room::RoomCatalog;
use mrbs_service::{ActivityRecorder, BookingService, RequestContext};

/// MRBS: meeting room booking with conflict and quota checks
#[derive(Debug, Parser)]
#[command(name = "mrbs", version, about, long_about = None)]
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
    /// Apply database migrations
    Migrate,
    /// Show the room catalog
    Rooms,
    /// List bookings for an operating day
    List(booking::ListArgs),
    /// Book a room
    Book(booking::BookArgs),
    /// Change an existing booking
    Edit(booking::EditArgs),
    /// Delete a booking
    Cancel(booking::CancelArgs),
    /// User management
    User(user::UserArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate => migrate::execute(config).await,
            Commands::Rooms => rooms::execute(config, self.format),
            Commands::List(args) => booking::list(args, config, self.format).await,
            Commands::Book(args) => booking::book(args, config, self.format).await,
            Commands::Edit(args) => booking::edit(args, config, self.format).await,
            Commands::Cancel(args) => booking::cancel(args, config).await,
            Commands::User(args) => user::execute(args, config, self.format).await,
        }
    }
}

/// Services wired against PostgreSQL for one command invocation.
pub struct Engine {
    pool: DatabasePool,
    users: UserRepository,
    service: BookingService,
}

impl Engine {
    /// Connect to the database and build the booking service.
    pub async fn open(config: &AppConfig) -> Result<Self, AppError> {
        let policy = config.booking.policy()?;
        let catalog = Arc::new(RoomCatalog::from_config(&config.rooms)?);
        let pool = DatabasePool::connect(&config.database).await?;

        let users = UserRepository::new(pool.pool().clone());
        let bookings = BookingRepository::new(pool.pool().clone(), policy.lock_timeout);
        let service = BookingService::new(
            Arc::new(bookings),
            catalog,
            policy,
            ActivityRecorder::new(Arc::new(users.clone())),
        );

        Ok(Self {
            pool,
            users,
            service,
        })
    }

    /// The booking service.
    pub fn service(&self) -> &BookingService {
        &self.service
    }

    /// The user repository.
    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    /// Resolve a login name to a caller identity.
    pub async fn act_as(&self, name: &str) -> Result<RequestContext, AppError> {
        let user = self
            .users
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User '{name}' not found")))?;
        Ok(RequestContext::new(user.id, user.privilege()))
    }

    /// Wait for pending side effects, then release the pool.
    pub async fn close(self) {
        self.service.activity().drain().await;
        self.pool.close().await;
    }
}
