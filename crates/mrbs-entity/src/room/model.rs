//! Room entity model.

use serde::{Deserialize, Serialize};

use mrbs_core::types::RoomId;

/// A bookable room. Immutable at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Room identifier.
    pub id: RoomId,
    /// Display name.
    pub name: String,
    /// Seating capacity.
    pub capacity: u32,
}

impl Room {
    /// Create a room entry.
    pub fn new(id: i32, name: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: RoomId(id),
            name: name.into(),
            capacity,
        }
    }
}
