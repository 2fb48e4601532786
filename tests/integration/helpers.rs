//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use mrbs_core::types::{BookingPolicy, RoomId};
use mrbs_database::MemoryBookingStore;
use mrbs_entity::booking::Booking;
use mrbs_entity::room::RoomCatalog;
use mrbs_entity::user::{CreateUser, PrivilegeLevel};
use mrbs_service::{ActivityRecorder, BookingRequest, BookingService, RequestContext};

/// Test application context
pub struct TestApp {
    /// Fake store shared by every service handle
    pub store: MemoryBookingStore,
    /// Booking service under test
    pub service: BookingService,
}

impl TestApp {
    /// Create a new test application with the default policy
    pub fn new() -> Self {
        Self::with_store(MemoryBookingStore::new())
    }

    /// Create a test application over an existing store
    pub fn with_store(store: MemoryBookingStore) -> Self {
        let shared = Arc::new(store.clone());
        let service = BookingService::new(
            shared.clone(),
            Arc::new(RoomCatalog::builtin()),
            BookingPolicy::default(),
            ActivityRecorder::new(shared),
        );
        Self { store, service }
    }

    /// Register a user and return their caller identity
    pub async fn user(&self, name: &str, level: PrivilegeLevel) -> RequestContext {
        let user = self
            .store
            .register_user(CreateUser {
                name: name.to_string(),
                display_name: format!("{name} (display)"),
                privilege: level,
            })
            .await
            .expect("Failed to register user");
        RequestContext::new(user.id, level)
    }

    /// Every committed booking on the test day
    pub async fn bookings(&self) -> Vec<Booking> {
        self.service
            .list(Some(day()))
            .await
            .expect("Failed to list bookings")
            .into_iter()
            .map(|row| row.listing.booking)
            .collect()
    }
}

/// The operating day all tests book on
pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid date")
}

/// Build a request for `room` starting at local `HH:MM` on the test day
pub fn request(room: i32, start: &str, slots: u32) -> BookingRequest {
    BookingRequest {
        room_id: RoomId(room),
        start_time: format!("2025-03-10 {start}"),
        duration_slots: slots,
        title: "Integration".to_string(),
        description: None,
    }
}

/// UTC instant for local `hour:minute` on the test day
pub fn local(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0)
        .single()
        .expect("valid instant")
        - chrono::Duration::hours(8)
}

/// Assert that no two bookings sharing a room overlap
pub fn assert_room_exclusive(bookings: &[Booking]) {
    for (i, a) in bookings.iter().enumerate() {
        for b in &bookings[i + 1..] {
            if a.room_id == b.room_id {
                assert!(
                    a.end_time <= b.start_time || b.end_time <= a.start_time,
                    "bookings {} and {} overlap in room {}",
                    a.id,
                    b.id,
                    a.room_id
                );
            }
        }
    }
}
