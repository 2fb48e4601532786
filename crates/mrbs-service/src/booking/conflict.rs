//! Conflict detection against the persisted timeline.
//!
//! Two intervals conflict iff `s1 < e2 && s2 < e1`. Abutting bookings are
//! fine. Every query runs on the caller's admission transaction and skips
//! the booking under edit.

use mrbs_core::result::AppResult;
use mrbs_core::types::{BookingId, RoomId, TimeInterval, UserId};
use mrbs_database::store::{AdmissionTx, ProbeTally};

/// Room- and user-level overlap checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictDetector;

impl ConflictDetector {
    /// Creates a new conflict detector.
    pub fn new() -> Self {
        Self
    }

    /// Whether `room_id` already holds a booking overlapping `interval`.
    ///
    /// Per-query form. Admission reads the combined probe through
    /// [`Self::room_conflict_in`] instead.
    pub async fn has_room_conflict(
        &self,
        tx: &mut dyn AdmissionTx,
        room_id: RoomId,
        interval: &TimeInterval,
        exclude: Option<BookingId>,
    ) -> AppResult<bool> {
        let count = tx.count_room_overlaps(room_id, interval, exclude).await?;
        Ok(count > 0)
    }

    /// Whether `user_id` already holds a booking, in any room, overlapping
    /// `interval`.
    ///
    /// Per-query form. Admission reads the combined probe through
    /// [`Self::user_conflict_in`] instead.
    pub async fn has_user_conflict(
        &self,
        tx: &mut dyn AdmissionTx,
        user_id: UserId,
        interval: &TimeInterval,
        exclude: Option<BookingId>,
    ) -> AppResult<bool> {
        let count = tx.count_user_overlaps(user_id, interval, exclude).await?;
        Ok(count > 0)
    }

    /// Room conflict as reported by a combined probe.
    pub fn room_conflict_in(&self, tally: &ProbeTally) -> bool {
        tally.room_overlaps > 0
    }

    /// User conflict as reported by a combined probe.
    pub fn user_conflict_in(&self, tally: &ProbeTally) -> bool {
        tally.user_overlaps > 0
    }
}
