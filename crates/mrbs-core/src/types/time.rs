//! Booking timestamp parsing, formatting and slot arithmetic.
//!
//! Callers exchange timestamps as local wall-clock strings at a fixed UTC
//! offset; the engine stores and compares them as UTC instants.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};

use crate::error::AppError;

/// Date layout, e.g. `2025-03-10`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date-time layout, e.g. `2025-03-10 08:30`.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Clock layout for operating window bounds, e.g. `08:00`.
pub const CLOCK_FORMAT: &str = "%H:%M";

/// Build a fixed offset from whole hours east of UTC.
pub fn fixed_offset(hours: i32) -> Result<FixedOffset, AppError> {
    FixedOffset::east_opt(hours * 3600)
        .ok_or_else(|| AppError::configuration(format!("Invalid UTC offset: {hours}h")))
}

/// Parse `YYYY-MM-DD HH:MM` as local time at `offset`.
pub fn parse_datetime(input: &str, offset: FixedOffset) -> Result<DateTime<Utc>, AppError> {
    let naive = NaiveDateTime::parse_from_str(input.trim(), DATETIME_FORMAT).map_err(|e| {
        AppError::with_source(
            crate::error::ErrorKind::Validation,
            format!("Invalid date-time '{input}', expected YYYY-MM-DD HH:MM"),
            e,
        )
    })?;
    local_to_utc(naive, offset)
}

/// Parse `YYYY-MM-DD`.
pub fn parse_date(input: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|e| {
        AppError::with_source(
            crate::error::ErrorKind::Validation,
            format!("Invalid date '{input}', expected YYYY-MM-DD"),
            e,
        )
    })
}

/// Parse `HH:MM`.
pub fn parse_clock(input: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(input.trim(), CLOCK_FORMAT)
        .map_err(|e| AppError::configuration(format!("Invalid clock time '{input}': {e}")))
}

/// Format an instant as `YYYY-MM-DD HH:MM` local time at `offset`.
pub fn format_datetime(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    instant.with_timezone(&offset).format(DATETIME_FORMAT).to_string()
}

/// Current calendar date at `offset`.
pub fn today(offset: FixedOffset) -> NaiveDate {
    Utc::now().with_timezone(&offset).date_naive()
}

/// Convert a local wall-clock time to UTC. Fixed offsets are never
/// ambiguous, so `single()` only fails on out-of-range dates.
pub fn local_to_utc(naive: NaiveDateTime, offset: FixedOffset) -> Result<DateTime<Utc>, AppError> {
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| AppError::validation(format!("Date-time out of range: {naive}")))
}

/// The fixed booking granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotUnit {
    minutes: u32,
}

impl SlotUnit {
    /// Create a slot unit; the unit must divide an hour evenly.
    pub fn new(minutes: u32) -> Result<Self, AppError> {
        if minutes == 0 || 60 % minutes != 0 {
            return Err(AppError::configuration(format!(
                "Slot unit must divide 60 minutes, got {minutes}"
            )));
        }
        Ok(Self { minutes })
    }

    /// Slot length in minutes.
    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    /// Slot length as a duration.
    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.minutes))
    }

    /// `start + slots * unit`.
    pub fn end_after(&self, start: DateTime<Utc>, slots: u32) -> DateTime<Utc> {
        start + Duration::minutes(i64::from(self.minutes) * i64::from(slots))
    }

    /// Whether `instant` sits on a slot boundary in local time.
    pub fn is_aligned(&self, instant: DateTime<Utc>, offset: FixedOffset) -> bool {
        let local = instant.with_timezone(&offset);
        local.second() == 0 && local.nanosecond() == 0 && local.minute() % self.minutes == 0
    }

    /// Whether `duration` is a positive whole number of slots.
    pub fn is_multiple(&self, duration: Duration) -> bool {
        let unit = self.duration().num_seconds();
        let secs = duration.num_seconds();
        secs > 0 && secs % unit == 0 && duration.subsec_nanos() == 0
    }
}

impl Default for SlotUnit {
    fn default() -> Self {
        Self { minutes: 30 }
    }
}
