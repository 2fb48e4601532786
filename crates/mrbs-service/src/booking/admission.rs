//! The admission coordinator.
//!
//! One admission is one store transaction:
//!
//! 1. validate the candidate (no store access)
//! 2. open the transaction and lock the room, plus the user for standard
//!    callers
//! 3. read every aggregate in one probe
//! 4. reject on room conflict, then (standard only) user conflict, then
//!    (standard only) quota
//! 5. insert or update, then commit
//!
//! Any failure after step 2 rolls back, so a rejected or failed admission
//! leaves the timeline exactly as it was.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, error, info, warn};

use mrbs_core::error::AppError;
use mrbs_core::result::AppResult;
use mrbs_core::types::time::format_datetime;
use mrbs_core::types::{BookingId, BookingPolicy};
use mrbs_database::repositories::db_now;
use mrbs_database::store::{AdmissionProbe, AdmissionTx, BookingStore};
use mrbs_entity::booking::{Booking, NewBooking};
use mrbs_entity::room::RoomCatalog;
use mrbs_entity::user::PrivilegeLevel;

use super::conflict::ConflictDetector;
use super::quota::QuotaTracker;

/// Serializes admission decisions against the booking timeline.
#[derive(Clone)]
pub struct AdmissionCoordinator {
    /// Transactional booking store.
    store: Arc<dyn BookingStore>,
    /// Bookable rooms.
    catalog: Arc<RoomCatalog>,
    /// Slot, window and limit constants.
    policy: BookingPolicy,
    /// Overlap checks.
    detector: ConflictDetector,
    /// Daily quota checks.
    quota: QuotaTracker,
}

impl std::fmt::Debug for AdmissionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionCoordinator")
            .field("catalog", &self.catalog)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl AdmissionCoordinator {
    /// Creates a new admission coordinator.
    pub fn new(
        store: Arc<dyn BookingStore>,
        catalog: Arc<RoomCatalog>,
        policy: BookingPolicy,
    ) -> Self {
        Self {
            store,
            catalog,
            quota: QuotaTracker::from_policy(&policy),
            detector: ConflictDetector::new(),
            policy,
        }
    }

    /// The policy in force.
    pub fn policy(&self) -> &BookingPolicy {
        &self.policy
    }

    /// The room catalog in force.
    pub fn catalog(&self) -> &RoomCatalog {
        &self.catalog
    }

    /// Check a candidate without touching the store.
    pub fn validate(&self, candidate: &NewBooking) -> AppResult<()> {
        if !self.catalog.exists(candidate.room_id) {
            return Err(AppError::validation(format!(
                "Room {} does not exist",
                candidate.room_id
            )));
        }

        let slot = self.policy.slot;
        let offset = self.policy.offset();
        let interval = &candidate.interval;
        if !slot.is_aligned(interval.start(), offset) {
            return Err(AppError::validation(format!(
                "Start time {} is not on a {}-minute boundary",
                format_datetime(interval.start(), offset),
                slot.minutes()
            )));
        }
        if !slot.is_multiple(interval.duration()) {
            return Err(AppError::validation(format!(
                "Duration must be a multiple of {} minutes",
                slot.minutes()
            )));
        }

        let longest = Duration::minutes(i64::from(slot.minutes()) * i64::from(self.policy.max_slots));
        if interval.duration() > longest {
            return Err(AppError::validation(format!(
                "A booking may span at most {} slots",
                self.policy.max_slots
            )));
        }

        if candidate.title.trim().is_empty() {
            return Err(AppError::validation("Title is required"));
        }
        Ok(())
    }

    /// Admit `candidate` for a caller at `level`.
    ///
    /// With `exclude` unset this inserts a new booking. With `exclude` set
    /// it updates that booking in place, and the booking's current slot is
    /// ignored by every check.
    pub async fn admit(
        &self,
        candidate: NewBooking,
        level: PrivilegeLevel,
        exclude: Option<BookingId>,
    ) -> AppResult<Booking> {
        self.validate(&candidate)?;

        let mut tx = self.store.begin().await?;
        match self.decide_and_write(tx.as_mut(), &candidate, level, exclude).await {
            Ok(booking) => {
                tx.commit().await?;
                info!(
                    booking_id = %booking.id,
                    room_id = %booking.room_id,
                    user_id = %booking.user_id,
                    %level,
                    edited = exclude.is_some(),
                    "Booking admitted"
                );
                Ok(booking)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    error!(error = %rollback_err, "Failed to roll back admission");
                }
                if err.is_rejection() {
                    warn!(
                        room_id = %candidate.room_id,
                        user_id = %candidate.user_id,
                        %level,
                        reason = %err.kind,
                        "Booking rejected"
                    );
                } else {
                    error!(room_id = %candidate.room_id, error = %err, "Admission failed");
                }
                Err(err)
            }
        }
    }

    async fn decide_and_write(
        &self,
        tx: &mut dyn AdmissionTx,
        candidate: &NewBooking,
        level: PrivilegeLevel,
        exclude: Option<BookingId>,
    ) -> AppResult<Booking> {
        let standard = !level.is_privileged();
        let interval = candidate.interval;

        tx.lock_scope(candidate.room_id, standard.then_some(candidate.user_id))
            .await?;

        let quota_window = if standard {
            Some(self.quota.day_window(interval.start())?)
        } else {
            None
        };
        let probe = AdmissionProbe {
            room_id: candidate.room_id,
            user_id: candidate.user_id,
            interval,
            check_user: standard,
            quota_window,
            exclude,
        };
        let tally = tx.tally(&probe).await?;
        debug!(?tally, "Admission probe");

        if self.detector.room_conflict_in(&tally) {
            return Err(AppError::room_conflict(format!(
                "Room {} is already booked for an overlapping time",
                self.catalog.display_name(candidate.room_id)
            )));
        }

        if standard {
            if self.detector.user_conflict_in(&tally) {
                return Err(AppError::user_conflict(
                    "You already have a booking at an overlapping time",
                ));
            }

            let existing = Duration::seconds(tally.existing_seconds);
            if !self.quota.admits(existing, &interval) {
                return Err(AppError::quota_exceeded(format!(
                    "Daily limit of {} minutes exceeded ({} minutes left today)",
                    self.quota.daily_limit().num_minutes(),
                    self.quota.remaining(existing).num_minutes()
                )));
            }
        }

        match exclude {
            None => {
                let booking = candidate.clone().into_booking(BookingId::new(), db_now());
                tx.insert(&booking).await?;
                Ok(booking)
            }
            Some(id) => tx
                .update(id, candidate)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Booking {id} not found"))),
        }
    }
}
