//! Presentation views returned to callers.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use mrbs_core::types::time::format_datetime;

use super::model::Booking;

/// A booking joined with its room's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingView {
    /// The booking itself.
    #[serde(flatten)]
    pub booking: Booking,
    /// Room display name from the catalog.
    pub room_name: String,
}

impl BookingView {
    /// Human-readable confirmation, e.g.
    /// `Alan Turing has been booked from 2025-03-10 08:00 to 2025-03-10 09:00.`
    pub fn summary(&self, offset: FixedOffset) -> String {
        format!(
            "{} has been booked from {} to {}.",
            self.room_name,
            format_datetime(self.booking.start_time, offset),
            format_datetime(self.booking.end_time, offset)
        )
    }
}

/// One row of the daily listing, joined with the booker's display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BookingListing {
    /// The booking itself.
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub booking: Booking,
    /// Display name of the booker.
    pub booked_by: String,
    /// Username of the booker.
    pub booked_by_username: String,
}

/// A listing row with the room display name attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBooking {
    /// Booking and booker.
    #[serde(flatten)]
    pub listing: BookingListing,
    /// Room display name from the catalog.
    pub room_name: String,
}
