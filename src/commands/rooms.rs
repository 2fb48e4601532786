//! Room catalog command.

use serde::Serialize;
use tabled::Tabled;

use mrbs_core::config::AppConfig;
use mrbs_core::error::AppError;
use mrbs_entity::room::RoomCatalog;

use crate::output::{self, OutputFormat};

/// Room display row for table output
#[derive(Debug, Serialize, Tabled)]
struct RoomRow {
    /// Room ID
    id: i32,
    /// Display name
    name: String,
    /// Seats
    capacity: u32,
}

/// Print the configured catalog.
pub fn execute(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let catalog = RoomCatalog::from_config(&config.rooms)?;
    let rows: Vec<RoomRow> = catalog
        .rooms()
        .iter()
        .map(|r| RoomRow {
            id: r.id.0,
            name: r.name.clone(),
            capacity: r.capacity,
        })
        .collect();

    output::print_list(&rows, format);
    Ok(())
}
