//! Admission policy configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::types::policy::BookingPolicy;

/// Admission policy knobs. Defaults reproduce the production policy:
/// 30-minute slots, a 3-hour daily quota, and an 08:00 to 02:00 operating
/// window at UTC+8.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Slot unit in minutes. All durations are multiples of this.
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: u32,
    /// Maximum booked seconds per standard user per operating day.
    #[serde(default = "default_daily_limit")]
    pub daily_limit_seconds: i64,
    /// Maximum slots in a single booking.
    #[serde(default = "default_max_slots")]
    pub max_slots: u32,
    /// Local time the operating day starts (`HH:MM`).
    #[serde(default = "default_opens_at")]
    pub opens_at: String,
    /// Local time the operating day ends (`HH:MM`, next day when earlier
    /// than or equal to `opens_at`).
    #[serde(default = "default_closes_at")]
    pub closes_at: String,
    /// Fixed UTC offset of local time, in hours.
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i32,
    /// How long an admission waits for its locks before failing as busy.
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout_ms: u64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            slot_minutes: default_slot_minutes(),
            daily_limit_seconds: default_daily_limit(),
            max_slots: default_max_slots(),
            opens_at: default_opens_at(),
            closes_at: default_closes_at(),
            utc_offset_hours: default_utc_offset(),
            lock_timeout_ms: default_lock_timeout(),
        }
    }
}

impl BookingConfig {
    /// Build the validated runtime policy.
    pub fn policy(&self) -> Result<BookingPolicy, AppError> {
        BookingPolicy::from_config(self)
    }
}

fn default_slot_minutes() -> u32 {
    30
}

fn default_daily_limit() -> i64 {
    3 * 3600
}

fn default_max_slots() -> u32 {
    36
}

fn default_opens_at() -> String {
    "08:00".to_string()
}

fn default_closes_at() -> String {
    "02:00".to_string()
}

fn default_utc_offset() -> i32 {
    8
}

fn default_lock_timeout() -> u64 {
    3000
}
