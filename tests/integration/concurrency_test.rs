//! Integration tests for concurrent admissions.

mod helpers;

use std::time::Duration;

use futures::future::join_all;

use mrbs_core::error::ErrorKind;
use mrbs_database::MemoryBookingStore;
use mrbs_database::store::BookingStore;
use mrbs_entity::user::PrivilegeLevel;

use helpers::{TestApp, request};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_overlapping_creates_admit_exactly_one() {
    let app = TestApp::new();
    let a = app.user("alice", PrivilegeLevel::Standard).await;
    let b = app.user("bob", PrivilegeLevel::Standard).await;

    let first = {
        let service = app.service.clone();
        tokio::spawn(async move { service.create(&a, request(3, "08:00", 2)).await })
    };
    let second = {
        let service = app.service.clone();
        tokio::spawn(async move { service.create(&b, request(3, "08:00", 2)).await })
    };

    let outcomes = [first.await.unwrap(), second.await.unwrap()];
    let admitted = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(admitted, 1);

    let loser = outcomes.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(loser.kind, ErrorKind::RoomConflict);
    assert_eq!(app.bookings().await.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_contenders_one_winner() {
    let app = TestApp::new();
    let mut contenders = Vec::new();
    for i in 0..12 {
        let level = if i % 3 == 0 {
            PrivilegeLevel::Privileged
        } else {
            PrivilegeLevel::Standard
        };
        contenders.push(app.user(&format!("user{i}"), level).await);
    }

    let tasks = contenders.into_iter().enumerate().map(|(i, ctx)| {
        let service = app.service.clone();
        // Staggered but all overlapping 09:00-09:30.
        let start = if i % 2 == 0 { "08:30" } else { "09:00" };
        tokio::spawn(async move { service.create(&ctx, request(5, start, 2)).await })
    });
    let outcomes: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    for err in outcomes.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.kind, ErrorKind::RoomConflict);
    }
    helpers::assert_room_exclusive(&app.bookings().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_quota_is_never_exceeded() {
    let app = TestApp::new();
    let a = app.user("alice", PrivilegeLevel::Standard).await;

    let tasks = (0..8).map(|i| {
        let service = app.service.clone();
        let start = format!("{:02}:00", 8 + i);
        tokio::spawn(async move { service.create(&a, request(i + 1, &start, 2)).await })
    });
    let outcomes: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 3);
    for err in outcomes.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.kind, ErrorKind::QuotaExceeded);
    }

    let held: i64 = app
        .bookings()
        .await
        .iter()
        .map(|b| (b.end_time - b.start_time).num_seconds())
        .sum();
    assert_eq!(held, 10_800);
}

#[tokio::test(start_paused = true)]
async fn test_lock_timeout_surfaces_as_busy() {
    let store = MemoryBookingStore::with_lock_timeout(Duration::from_millis(100));
    let app = TestApp::with_store(store.clone());
    let a = app.user("alice", PrivilegeLevel::Standard).await;

    let held = store.begin().await.unwrap();
    let err = app
        .service
        .create(&a, request(3, "08:00", 2))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Busy);
    assert!(err.is_retryable());
    drop(held);

    // Retrying once the lock is free succeeds exactly once.
    app.service.create(&a, request(3, "08:00", 2)).await.unwrap();
    assert_eq!(app.bookings().await.len(), 1);
}
