//! User identity as consumed by the engine.

pub mod level;
pub mod model;

pub use level::PrivilegeLevel;
pub use model::{CreateUser, User};
