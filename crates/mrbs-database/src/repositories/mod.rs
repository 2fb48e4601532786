//! PostgreSQL repository implementations.

pub mod booking;
pub mod user;

pub use booking::{BookingRepository, PgAdmissionTx, db_now};
pub use user::UserRepository;
