//! Daily quota accounting for standard users.

use chrono::{DateTime, Duration, Utc};

use mrbs_core::result::AppResult;
use mrbs_core::types::{BookingId, BookingPolicy, OperatingWindow, TimeInterval, UserId};
use mrbs_database::store::AdmissionTx;

/// Sums a user's booked time per operating day and checks it against the
/// daily limit.
///
/// Only bookings wholly inside the day's window count. A booking that
/// straddles the window's close is not charged to either day.
#[derive(Debug, Clone, Copy)]
pub struct QuotaTracker {
    window: OperatingWindow,
    daily_limit: Duration,
}

impl QuotaTracker {
    /// Creates a new quota tracker.
    pub fn new(window: OperatingWindow, daily_limit: Duration) -> Self {
        Self {
            window,
            daily_limit,
        }
    }

    /// Tracker using the policy's window and limit.
    pub fn from_policy(policy: &BookingPolicy) -> Self {
        Self::new(policy.window, policy.daily_limit)
    }

    /// The configured daily limit.
    pub fn daily_limit(&self) -> Duration {
        self.daily_limit
    }

    /// `[dayStart, dayEnd)` for the operating day containing `start`.
    pub fn day_window(&self, start: DateTime<Utc>) -> AppResult<TimeInterval> {
        self.window.containing(start)
    }

    /// Time `user_id` already holds inside `day`, ignoring `exclude`.
    ///
    /// Per-query form; admission takes `existing_seconds` from the combined
    /// probe.
    pub async fn existing_seconds_today(
        &self,
        tx: &mut dyn AdmissionTx,
        user_id: UserId,
        day: &TimeInterval,
        exclude: Option<BookingId>,
    ) -> AppResult<Duration> {
        let seconds = tx.seconds_within(user_id, day, exclude).await?;
        Ok(Duration::seconds(seconds))
    }

    /// Whether adding `candidate` to `existing` stays within the limit.
    pub fn admits(&self, existing: Duration, candidate: &TimeInterval) -> bool {
        existing + candidate.duration() <= self.daily_limit
    }

    /// Time left today given `existing`, never negative.
    pub fn remaining(&self, existing: Duration) -> Duration {
        (self.daily_limit - existing).max(Duration::zero())
    }
}
