//! End-to-end walk through the admission rules on one operating day.

mod helpers;

use mrbs_core::error::ErrorKind;
use mrbs_entity::user::PrivilegeLevel;

use helpers::{TestApp, local, request};

#[tokio::test]
async fn test_admission_scenario() {
    let app = TestApp::new();
    let a = app.user("alice", PrivilegeLevel::Standard).await;
    let b = app.user("bob", PrivilegeLevel::Standard).await;
    let admin = app.user("root", PrivilegeLevel::Privileged).await;

    // A books room 3 08:00-09:00.
    let first = app
        .service
        .create(&a, request(3, "08:00", 2))
        .await
        .expect("first booking should be admitted");
    assert_eq!(first.booking.start_time, local(8, 0));
    assert_eq!(first.booking.end_time, local(9, 0));

    // B overlaps it in room 3.
    let err = app
        .service
        .create(&b, request(3, "08:30", 2))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RoomConflict);

    // A tries to be in two rooms at once.
    let err = app
        .service
        .create(&a, request(4, "08:30", 1))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UserConflict);

    // 1h held + 3.5h requested > 3h.
    let err = app
        .service
        .create(&a, request(5, "09:00", 7))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::QuotaExceeded);

    // Privilege never overrides room exclusivity.
    let err = app
        .service
        .create(&admin, request(3, "08:30", 2))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RoomConflict);

    // Privileged users may hold overlapping bookings in different rooms.
    app.service
        .create(&admin, request(3, "09:00", 2))
        .await
        .expect("admin room 3 booking");
    app.service
        .create(&admin, request(4, "09:00", 2))
        .await
        .expect("privilege exempts the user-conflict check");

    let bookings = app.bookings().await;
    assert_eq!(bookings.len(), 3);
    helpers::assert_room_exclusive(&bookings);
}

#[tokio::test]
async fn test_quota_bound_holds_across_rooms() {
    let app = TestApp::new();
    let a = app.user("alice", PrivilegeLevel::Standard).await;

    for (room, start) in [(1, "08:00"), (2, "09:00"), (3, "10:00")] {
        app.service
            .create(&a, request(room, start, 2))
            .await
            .expect("within quota");
    }

    // Exactly 3h held; even one more slot is refused.
    let err = app
        .service
        .create(&a, request(4, "12:00", 1))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::QuotaExceeded);
    assert!(err.is_rejection());

    // The next operating day starts a fresh quota.
    let mut tomorrow = request(4, "12:00", 2);
    tomorrow.start_time = "2025-03-11 12:00".to_string();
    app.service
        .create(&a, tomorrow)
        .await
        .expect("new operating day");
}

#[tokio::test]
async fn test_late_night_booking_counts_toward_previous_day() {
    let app = TestApp::new();
    let a = app.user("alice", PrivilegeLevel::Standard).await;

    app.service
        .create(&a, request(1, "21:30", 5))
        .await
        .expect("evening booking");

    // 01:00 on the 11th belongs to the operating day of the 10th.
    let mut late = request(2, "01:00", 2);
    late.start_time = "2025-03-11 01:00".to_string();
    let err = app.service.create(&a, late).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::QuotaExceeded);
}
