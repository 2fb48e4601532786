//! Booking entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use mrbs_core::error::AppError;
use mrbs_core::types::{BookingId, RoomId, TimeInterval, UserId};

/// A committed reservation of one room for `[start_time, end_time)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Booking {
    /// Unique booking identifier.
    pub id: BookingId,
    /// Owning user.
    pub user_id: UserId,
    /// Reserved room.
    pub room_id: RoomId,
    /// Inclusive start.
    pub start_time: DateTime<Utc>,
    /// Exclusive end.
    pub end_time: DateTime<Utc>,
    /// Short title.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// When the booking was first admitted.
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// The reserved interval.
    pub fn interval(&self) -> Result<TimeInterval, AppError> {
        TimeInterval::new(self.start_time, self.end_time)
    }

    /// Whether `user_id` owns this booking.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

/// A validated candidate awaiting admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBooking {
    /// User the booking will belong to.
    pub user_id: UserId,
    /// Requested room.
    pub room_id: RoomId,
    /// Requested interval.
    pub interval: TimeInterval,
    /// Short title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
}

impl NewBooking {
    /// Materialize the candidate as a booking row.
    pub fn into_booking(self, id: BookingId, created_at: DateTime<Utc>) -> Booking {
        Booking {
            id,
            user_id: self.user_id,
            room_id: self.room_id,
            start_time: self.interval.start(),
            end_time: self.interval.end(),
            title: self.title,
            description: self.description,
            created_at,
        }
    }
}
