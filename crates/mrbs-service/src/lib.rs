//! # mrbs-service
//!
//! The admission engine. [`booking::AdmissionCoordinator`] decides whether a
//! candidate booking may be committed, consulting the
//! [`booking::ConflictDetector`] and [`booking::QuotaTracker`] inside one
//! store transaction. [`booking::BookingService`] exposes the create, edit,
//! delete and listing operations on top of it.
//!
//! Services receive their store and catalog as `Arc`s at construction time.

pub mod booking;
pub mod context;

pub use booking::{
    ActivityRecorder, AdmissionCoordinator, BookingRequest, BookingService, ConflictDetector,
    QuotaTracker,
};
pub use context::RequestContext;
