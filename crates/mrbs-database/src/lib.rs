//! # mrbs-database
//!
//! Persistence for the booking engine. [`store`] defines the transactional
//! seam the admission path is written against; [`repositories`] implements
//! it on PostgreSQL and [`memory`] implements it in process.

pub mod connection;
pub mod error;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryBookingStore;
pub use repositories::{BookingRepository, UserRepository};
pub use store::{ActivityMarker, AdmissionProbe, AdmissionTx, BookingStore, ProbeTally};
