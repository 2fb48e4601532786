//! Integration tests for edit, delete and listing.

mod helpers;

use mrbs_core::error::ErrorKind;
use mrbs_core::types::{BookingId, RoomId};
use mrbs_entity::user::PrivilegeLevel;

use helpers::{TestApp, day, local, request};

#[tokio::test]
async fn test_edit_in_place_never_conflicts_with_itself() {
    let app = TestApp::new();
    let a = app.user("alice", PrivilegeLevel::Standard).await;

    let booking = app
        .service
        .create(&a, request(3, "08:00", 6))
        .await
        .expect("3h booking")
        .booking;

    // Same room and time, at the full quota.
    let mut same = request(3, "08:00", 6);
    same.title = "Renamed".to_string();
    let edited = app
        .service
        .edit(&a, booking.id, same)
        .await
        .expect("editing to its own slot");
    assert_eq!(edited.booking.id, booking.id);
    assert_eq!(edited.booking.title, "Renamed");

    // Shift by half an hour, overlapping the old slot.
    let shifted = app
        .service
        .edit(&a, booking.id, request(3, "08:30", 6))
        .await
        .expect("shifting over its own slot");
    assert_eq!(shifted.booking.start_time, local(8, 30));
    assert_eq!(app.bookings().await.len(), 1);
}

#[tokio::test]
async fn test_rejected_edit_keeps_original() {
    let app = TestApp::new();
    let a = app.user("alice", PrivilegeLevel::Standard).await;
    let b = app.user("bob", PrivilegeLevel::Standard).await;

    let mine = app
        .service
        .create(&a, request(3, "08:00", 2))
        .await
        .unwrap()
        .booking;
    app.service.create(&b, request(5, "10:00", 2)).await.unwrap();

    let err = app
        .service
        .edit(&a, mine.id, request(5, "10:30", 2))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RoomConflict);

    let stored = app.service.get(mine.id).await.unwrap().booking;
    assert_eq!(stored, mine);
}

#[tokio::test]
async fn test_edit_requires_owner_or_privilege() {
    let app = TestApp::new();
    let a = app.user("alice", PrivilegeLevel::Standard).await;
    let b = app.user("bob", PrivilegeLevel::Standard).await;
    let admin = app.user("root", PrivilegeLevel::Privileged).await;

    let booking = app
        .service
        .create(&a, request(3, "08:00", 2))
        .await
        .unwrap()
        .booking;

    let err = app
        .service
        .edit(&b, booking.id, request(3, "09:00", 2))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);

    let moved = app
        .service
        .edit(&admin, booking.id, request(6, "09:00", 2))
        .await
        .expect("privileged edit");
    assert_eq!(moved.booking.room_id, RoomId(6));
    assert_eq!(moved.booking.user_id, a.user_id);
    assert_eq!(moved.room_name, "Marie Curie");
}

#[tokio::test]
async fn test_edit_of_missing_booking_is_not_found() {
    let app = TestApp::new();
    let a = app.user("alice", PrivilegeLevel::Standard).await;

    let err = app
        .service
        .edit(&a, BookingId::new(), request(3, "08:00", 2))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_is_idempotent_and_owner_scoped() {
    let app = TestApp::new();
    let a = app.user("alice", PrivilegeLevel::Standard).await;
    let b = app.user("bob", PrivilegeLevel::Standard).await;

    let booking = app
        .service
        .create(&a, request(3, "08:00", 2))
        .await
        .unwrap()
        .booking;

    // Indistinguishable from a missing id.
    let foreign = app.service.delete(&b, booking.id).await.unwrap_err();
    let missing = app.service.delete(&b, BookingId::new()).await.unwrap_err();
    assert_eq!(foreign.kind, ErrorKind::NotFound);
    assert_eq!(missing.kind, ErrorKind::NotFound);
    assert_eq!(app.bookings().await.len(), 1);

    app.service.delete(&a, booking.id).await.unwrap();
    let again = app.service.delete(&a, booking.id).await.unwrap_err();
    assert_eq!(again.kind, ErrorKind::NotFound);
    assert!(app.bookings().await.is_empty());

    // The freed slot can be booked again.
    app.service.create(&b, request(3, "08:00", 2)).await.unwrap();
}

#[tokio::test]
async fn test_listing_joins_display_metadata() {
    let app = TestApp::new();
    let a = app.user("alice", PrivilegeLevel::Standard).await;
    let b = app.user("bob", PrivilegeLevel::Standard).await;

    app.service.create(&b, request(9, "10:00", 2)).await.unwrap();
    app.service.create(&a, request(1, "08:00", 2)).await.unwrap();

    let rows = app.service.list(Some(day())).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].room_name, "Seminar Room 1");
    assert_eq!(rows[0].listing.booked_by, "alice (display)");
    assert_eq!(rows[0].listing.booked_by_username, "alice");
    assert_eq!(rows[1].room_name, "Thomas Edison");

    let next_day = day().succ_opt().unwrap();
    assert!(app.service.list(Some(next_day)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_activity_marker_is_best_effort() {
    let app = TestApp::new();
    let a = app.user("alice", PrivilegeLevel::Standard).await;

    app.service.create(&a, request(1, "08:00", 2)).await.unwrap();
    app.service.activity().drain().await;
    let marked = app.store.user(a.user_id).await.unwrap().last_active_at;
    assert!(marked.is_some());

    // An unregistered caller has no marker to update; the booking still
    // succeeds.
    let ghost = mrbs_service::RequestContext::standard(mrbs_core::types::UserId::new());
    app.service.create(&ghost, request(2, "08:00", 2)).await.unwrap();
    app.service.activity().drain().await;
}
