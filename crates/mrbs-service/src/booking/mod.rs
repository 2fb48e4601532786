//! Booking admission and lifecycle.

pub mod activity;
pub mod admission;
pub mod conflict;
pub mod quota;
pub mod request;
pub mod service;

pub use activity::ActivityRecorder;
pub use admission::AdmissionCoordinator;
pub use conflict::ConflictDetector;
pub use quota::QuotaTracker;
pub use request::BookingRequest;
pub use service::BookingService;
