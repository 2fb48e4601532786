//! The transactional store seam used by the admission path.
//!
//! Implementations must guarantee that two transactions which lock the same
//! scope (room, or standard user) run one after the other, and that a
//! transaction which is dropped without [`AdmissionTx::commit`] leaves no
//! trace. Two implementations are provided:
//! - PostgreSQL ([`crate::repositories::BookingRepository`]), using
//!   transaction-scoped advisory locks
//! - In-memory ([`crate::memory::MemoryBookingStore`]), using a Tokio mutex

use async_trait::async_trait;

use mrbs_core::result::AppResult;
use mrbs_core::types::{BookingId, RoomId, TimeInterval, UserId};
use mrbs_entity::booking::{Booking, BookingListing, NewBooking};

/// Everything the admission checks need to know, gathered in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionProbe {
    /// Candidate room.
    pub room_id: RoomId,
    /// User the booking belongs to.
    pub user_id: UserId,
    /// Candidate interval.
    pub interval: TimeInterval,
    /// Whether to count the user's overlapping bookings.
    pub check_user: bool,
    /// Operating day to sum the user's booked seconds over, if quota applies.
    pub quota_window: Option<TimeInterval>,
    /// Booking under edit, ignored by every aggregate.
    pub exclude: Option<BookingId>,
}

/// Aggregates returned by a probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct ProbeTally {
    /// Bookings in the room overlapping the candidate.
    pub room_overlaps: i64,
    /// The user's bookings overlapping the candidate (any room).
    pub user_overlaps: i64,
    /// Seconds the user already holds wholly inside the quota window.
    pub existing_seconds: i64,
}

/// One admission unit of work.
///
/// Reads observe committed state as of lock acquisition; writes become
/// visible only on commit.
#[async_trait]
pub trait AdmissionTx: Send {
    /// Serialize against other admissions on the same room and, when
    /// given, the same user. Fails with `Busy` on lock timeout.
    async fn lock_scope(&mut self, room_id: RoomId, user_id: Option<UserId>) -> AppResult<()>;

    /// Count bookings in `room_id` overlapping `interval`.
    async fn count_room_overlaps(
        &mut self,
        room_id: RoomId,
        interval: &TimeInterval,
        exclude: Option<BookingId>,
    ) -> AppResult<i64>;

    /// Count bookings held by `user_id` overlapping `interval`.
    async fn count_user_overlaps(
        &mut self,
        user_id: UserId,
        interval: &TimeInterval,
        exclude: Option<BookingId>,
    ) -> AppResult<i64>;

    /// Sum the seconds of `user_id`'s bookings wholly inside `window`.
    async fn seconds_within(
        &mut self,
        user_id: UserId,
        window: &TimeInterval,
        exclude: Option<BookingId>,
    ) -> AppResult<i64>;

    /// Gather every aggregate `probe` asks for. The default issues one
    /// query per aggregate; stores that can do it in a single round trip
    /// override it.
    async fn tally(&mut self, probe: &AdmissionProbe) -> AppResult<ProbeTally> {
        let room_overlaps = self
            .count_room_overlaps(probe.room_id, &probe.interval, probe.exclude)
            .await?;
        let user_overlaps = if probe.check_user {
            self.count_user_overlaps(probe.user_id, &probe.interval, probe.exclude)
                .await?
        } else {
            0
        };
        let existing_seconds = match &probe.quota_window {
            Some(window) => {
                self.seconds_within(probe.user_id, window, probe.exclude)
                    .await?
            }
            None => 0,
        };
        Ok(ProbeTally {
            room_overlaps,
            user_overlaps,
            existing_seconds,
        })
    }

    /// Stage a new booking.
    async fn insert(&mut self, booking: &Booking) -> AppResult<()>;

    /// Stage new values for booking `id`. Returns `None` if it no longer
    /// exists.
    async fn update(&mut self, id: BookingId, candidate: &NewBooking) -> AppResult<Option<Booking>>;

    /// Make staged writes visible and release locks.
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// Discard staged writes and release locks.
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// The persisted booking timeline.
#[async_trait]
pub trait BookingStore: Send + Sync + 'static {
    /// Open an admission transaction.
    async fn begin(&self) -> AppResult<Box<dyn AdmissionTx>>;

    /// Point lookup.
    async fn find_by_id(&self, id: BookingId) -> AppResult<Option<Booking>>;

    /// Delete `id`, restricted to `owner` when given. Returns rows affected.
    async fn delete(&self, id: BookingId, owner: Option<UserId>) -> AppResult<u64>;

    /// Bookings whose start falls in `window`, with booker metadata,
    /// ordered by start time then room.
    async fn list_starting_within(&self, window: &TimeInterval) -> AppResult<Vec<BookingListing>>;
}

/// Best-effort per-user activity marker.
#[async_trait]
pub trait ActivityMarker: Send + Sync + 'static {
    /// Record that `user_id` just completed a booking operation.
    async fn touch_last_active(&self, user_id: UserId) -> AppResult<()>;
}
