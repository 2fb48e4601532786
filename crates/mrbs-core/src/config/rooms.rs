//! Room catalog configuration.

use serde::{Deserialize, Serialize};

/// One bookable room as declared in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Room identifier referenced by bookings.
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Seating capacity.
    #[serde(default)]
    pub capacity: u32,
}
