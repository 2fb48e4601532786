//! The daily operating window used to bound quota accounting and listings.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};

use super::interval::TimeInterval;
use super::time::local_to_utc;
use crate::error::AppError;

/// A daily span that opens at a local clock time and may close after
/// midnight (08:00 to 02:00 next day by default).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingWindow {
    opens_at: NaiveTime,
    length: Duration,
    offset: FixedOffset,
}

impl OperatingWindow {
    /// Build a window. A closing time at or before the opening time wraps to
    /// the next calendar day.
    pub fn new(opens_at: NaiveTime, closes_at: NaiveTime, offset: FixedOffset) -> Self {
        let mut length = closes_at - opens_at;
        if length <= Duration::zero() {
            length += Duration::days(1);
        }
        Self {
            opens_at,
            length,
            offset,
        }
    }

    /// UTC offset of the window's local clock.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Window length.
    pub fn length(&self) -> Duration {
        self.length
    }

    /// `[opens, closes)` for the operating day that starts on `date`.
    pub fn bounds(&self, date: NaiveDate) -> Result<TimeInterval, AppError> {
        let start = local_to_utc(date.and_time(self.opens_at), self.offset)?;
        TimeInterval::new(start, start + self.length)
    }

    /// The operating day an instant is accounted to. Instants before the
    /// opening time belong to the previous day's window, so a 01:00 booking
    /// counts towards the evening it continues.
    pub fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        let local = instant.with_timezone(&self.offset);
        let date = local.date_naive();
        if local.time() < self.opens_at {
            date.pred_opt().unwrap_or(date)
        } else {
            date
        }
    }

    /// Bounds of the operating day `instant` is accounted to.
    pub fn containing(&self, instant: DateTime<Utc>) -> Result<TimeInterval, AppError> {
        self.bounds(self.day_of(instant))
    }
}

impl Default for OperatingWindow {
    fn default() -> Self {
        let opens = NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN);
        let closes = NaiveTime::from_hms_opt(2, 0, 0).unwrap_or(NaiveTime::MIN);
        let offset = FixedOffset::east_opt(8 * 3600).unwrap_or(Utc.fix());
        Self::new(opens, closes, offset)
    }
}
