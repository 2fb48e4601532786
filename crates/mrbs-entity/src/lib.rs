//! # mrbs-entity
//!
//! Domain entity models for the room booking engine. Database row types
//! derive `sqlx::FromRow`; the room catalog is an immutable in-process
//! table built from configuration.

pub mod booking;
pub mod room;
pub mod user;
