//! Room catalog entities.

pub mod catalog;
pub mod model;

pub use catalog::RoomCatalog;
pub use model::Room;
