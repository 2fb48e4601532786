//! # mrbs-core
//!
//! Core crate for the meeting room booking engine. Contains configuration
//! schemas, typed identifiers, booking time and interval utilities, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other MRBS crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
