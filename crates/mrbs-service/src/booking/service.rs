//! Booking lifecycle service: create, edit, delete and the daily listing.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use mrbs_core::error::AppError;
use mrbs_core::result::AppResult;
use mrbs_core::types::time::today;
use mrbs_core::types::{BookingId, BookingPolicy};
use mrbs_database::store::BookingStore;
use mrbs_entity::booking::{Booking, BookingView, DailyBooking};
use mrbs_entity::room::{Room, RoomCatalog};

use super::activity::ActivityRecorder;
use super::admission::AdmissionCoordinator;
use super::request::BookingRequest;
use crate::context::RequestContext;

/// The operations exposed to callers.
///
/// Every mutation goes through the [`AdmissionCoordinator`] or the store's
/// owner-filtered delete; nothing else writes the timeline.
#[derive(Clone)]
pub struct BookingService {
    /// Admission path for create and edit.
    admission: AdmissionCoordinator,
    /// Store for point reads, deletes and listings.
    store: Arc<dyn BookingStore>,
    /// Last-activity side effect.
    activity: ActivityRecorder,
}

impl std::fmt::Debug for BookingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingService")
            .field("admission", &self.admission)
            .field("activity", &self.activity)
            .finish_non_exhaustive()
    }
}

impl BookingService {
    /// Creates a new booking service.
    pub fn new(
        store: Arc<dyn BookingStore>,
        catalog: Arc<RoomCatalog>,
        policy: BookingPolicy,
        activity: ActivityRecorder,
    ) -> Self {
        Self {
            admission: AdmissionCoordinator::new(Arc::clone(&store), catalog, policy),
            store,
            activity,
        }
    }

    /// The policy in force.
    pub fn policy(&self) -> &BookingPolicy {
        self.admission.policy()
    }

    /// Bookable rooms ordered by id.
    pub fn rooms(&self) -> &[Room] {
        self.admission.catalog().rooms()
    }

    /// Last-activity recorder, for draining on shutdown.
    pub fn activity(&self) -> &ActivityRecorder {
        &self.activity
    }

    /// Book a room for the caller.
    pub async fn create(&self, ctx: &RequestContext, req: BookingRequest) -> AppResult<BookingView> {
        let candidate = req.into_candidate(ctx.user_id, self.policy())?;
        let booking = self.admission.admit(candidate, ctx.level, None).await?;

        self.activity.record(ctx.user_id);
        Ok(self.view(booking))
    }

    /// Replace the room, time, title and description of booking `id`.
    ///
    /// The booking keeps its owner even when a privileged caller edits it.
    /// If admission rejects the new values the stored booking is untouched.
    pub async fn edit(
        &self,
        ctx: &RequestContext,
        id: BookingId,
        req: BookingRequest,
    ) -> AppResult<BookingView> {
        let existing = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {id} not found")))?;

        if !ctx.can_modify(existing.user_id) {
            return Err(AppError::unauthorized(
                "Only the owner or a privileged user may edit this booking",
            ));
        }

        let candidate = req.into_candidate(existing.user_id, self.policy())?;
        let booking = self.admission.admit(candidate, ctx.level, Some(id)).await?;

        self.activity.record(ctx.user_id);
        Ok(self.view(booking))
    }

    /// Delete booking `id`.
    ///
    /// Standard callers can only reach their own bookings; anything else is
    /// reported as `NotFound`, the same as a missing id.
    pub async fn delete(&self, ctx: &RequestContext, id: BookingId) -> AppResult<()> {
        let owner = (!ctx.is_privileged()).then_some(ctx.user_id);
        let affected = self.store.delete(id, owner).await?;
        if affected == 0 {
            return Err(AppError::not_found(format!("Booking {id} not found")));
        }

        info!(booking_id = %id, user_id = %ctx.user_id, level = %ctx.level, "Booking deleted");
        self.activity.record(ctx.user_id);
        Ok(())
    }

    /// Look up one booking.
    pub async fn get(&self, id: BookingId) -> AppResult<BookingView> {
        self.store
            .find_by_id(id)
            .await?
            .map(|b| self.view(b))
            .ok_or_else(|| AppError::not_found(format!("Booking {id} not found")))
    }

    /// Bookings starting within the operating window of `date`, today when
    /// unset, ordered by start time then room.
    pub async fn list(&self, date: Option<NaiveDate>) -> AppResult<Vec<DailyBooking>> {
        let policy = self.policy();
        let date = date.unwrap_or_else(|| today(policy.offset()));
        let window = policy.window.bounds(date)?;

        let catalog = self.admission.catalog();
        let rows = self.store.list_starting_within(&window).await?;
        Ok(rows
            .into_iter()
            .map(|listing| DailyBooking {
                room_name: catalog.display_name(listing.booking.room_id),
                listing,
            })
            .collect())
    }

    fn view(&self, booking: Booking) -> BookingView {
        BookingView {
            room_name: self.admission.catalog().display_name(booking.room_id),
            booking,
        }
    }
}
