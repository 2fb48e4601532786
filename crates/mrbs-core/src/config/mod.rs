//! Application configuration schemas.
//!
//! All configuration structs are deserialized from a TOML file via the
//! `config` crate, overlaid with `MRBS__`-prefixed environment variables
//! (for example `MRBS__DATABASE__URL`).

pub mod booking;
pub mod database;
pub mod logging;
pub mod rooms;

use serde::{Deserialize, Serialize};

pub use self::booking::BookingConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::rooms::RoomConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Admission policy settings.
    #[serde(default)]
    pub booking: BookingConfig,
    /// Room catalog override. Empty means the built-in catalog.
    #[serde(default)]
    pub rooms: Vec<RoomConfig>,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file and the environment.
    ///
    /// The file is optional; environment variables prefixed with `MRBS`
    /// and separated by `__` take precedence over it.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("MRBS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
