//! The fixed table of bookable rooms.

use std::collections::HashSet;

use mrbs_core::config::RoomConfig;
use mrbs_core::error::AppError;
use mrbs_core::types::RoomId;

use super::model::Room;

/// Upper bound on catalog size.
pub const MAX_ROOMS: usize = 10;

/// Immutable room id to metadata table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomCatalog {
    rooms: Vec<Room>,
}

impl RoomCatalog {
    /// The rooms shipped with the engine.
    pub fn builtin() -> Self {
        Self {
            rooms: vec![
                Room::new(1, "Seminar Room 1", 50),
                Room::new(2, "Seminar Room 2", 50),
                Room::new(3, "Alan Turing", 4),
                Room::new(4, "Da Vinci", 10),
                Room::new(5, "Isaac Newton", 10),
                Room::new(6, "Marie Curie", 4),
                Room::new(7, "Michael Faraday", 4),
                Room::new(8, "Nikola Tesla", 4),
                Room::new(9, "Thomas Edison", 6),
            ],
        }
    }

    /// Build a catalog from configuration, falling back to the built-in
    /// rooms when none are configured.
    pub fn from_config(entries: &[RoomConfig]) -> Result<Self, AppError> {
        if entries.is_empty() {
            return Ok(Self::builtin());
        }
        if entries.len() > MAX_ROOMS {
            return Err(AppError::configuration(format!(
                "At most {MAX_ROOMS} rooms may be configured, got {}",
                entries.len()
            )));
        }

        let mut seen = HashSet::new();
        let mut rooms = Vec::with_capacity(entries.len());
        for entry in entries {
            if !seen.insert(entry.id) {
                return Err(AppError::configuration(format!(
                    "Duplicate room id {}",
                    entry.id
                )));
            }
            if entry.name.trim().is_empty() {
                return Err(AppError::configuration(format!(
                    "Room {} has an empty name",
                    entry.id
                )));
            }
            rooms.push(Room::new(entry.id, entry.name.trim(), entry.capacity));
        }
        rooms.sort_by_key(|r| r.id);

        Ok(Self { rooms })
    }

    /// Whether `id` is bookable.
    pub fn exists(&self, id: RoomId) -> bool {
        self.get(id).is_some()
    }

    /// Look up a room.
    pub fn get(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    /// Display name for `id`, or the id itself for unknown rooms.
    pub fn display_name(&self, id: RoomId) -> String {
        self.get(id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| format!("Room {id}"))
    }

    /// All rooms ordered by id.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }
}

impl Default for RoomCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
