//! Booking domain entities.

pub mod model;
pub mod view;

pub use model::{Booking, NewBooking};
pub use view::{BookingListing, BookingView, DailyBooking};
