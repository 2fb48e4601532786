//! Validated runtime admission policy.

use std::time::Duration as StdDuration;

use chrono::{Duration, FixedOffset};

use super::time::{fixed_offset, parse_clock, SlotUnit};
use super::window::OperatingWindow;
use crate::config::BookingConfig;
use crate::error::AppError;

/// Policy constants consumed by the admission path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    /// Booking granularity.
    pub slot: SlotUnit,
    /// Daily window for quota accounting and listings.
    pub window: OperatingWindow,
    /// Maximum booked time per standard user per operating day.
    pub daily_limit: Duration,
    /// Maximum slots in one booking.
    pub max_slots: u32,
    /// How long an admission may wait for its locks.
    pub lock_timeout: StdDuration,
}

impl BookingPolicy {
    /// Validate a [`BookingConfig`] into a policy.
    pub fn from_config(config: &BookingConfig) -> Result<Self, AppError> {
        let offset = fixed_offset(config.utc_offset_hours)?;
        let opens = parse_clock(&config.opens_at)?;
        let closes = parse_clock(&config.closes_at)?;

        if config.daily_limit_seconds <= 0 {
            return Err(AppError::configuration("daily_limit_seconds must be positive"));
        }
        if config.max_slots == 0 {
            return Err(AppError::configuration("max_slots must be at least 1"));
        }

        Ok(Self {
            slot: SlotUnit::new(config.slot_minutes)?,
            window: OperatingWindow::new(opens, closes, offset),
            daily_limit: Duration::seconds(config.daily_limit_seconds),
            max_slots: config.max_slots,
            lock_timeout: StdDuration::from_millis(config.lock_timeout_ms),
        })
    }

    /// Local clock offset.
    pub fn offset(&self) -> FixedOffset {
        self.window.offset()
    }
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            slot: SlotUnit::default(),
            window: OperatingWindow::default(),
            daily_limit: Duration::seconds(3 * 3600),
            max_slots: 36,
            lock_timeout: StdDuration::from_secs(3),
        }
    }
}
