//! Shared domain value types.

pub mod id;
pub mod interval;
pub mod policy;
pub mod time;
pub mod window;

pub use id::{BookingId, RoomId, UserId};
pub use interval::TimeInterval;
pub use policy::BookingPolicy;
pub use time::SlotUnit;
pub use window::OperatingWindow;
