//! Integration tests against a live PostgreSQL database.
//!
//! Run with `MRBS_TEST_DATABASE_URL` set and `--ignored`. Each test works
//! on its own users, so tests can share one database.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use mrbs_core::config::DatabaseConfig;
use mrbs_core::error::ErrorKind;
use mrbs_core::types::{BookingPolicy, RoomId};
use mrbs_database::migration::run_migrations;
use mrbs_database::{BookingRepository, DatabasePool, UserRepository};
use mrbs_entity::room::RoomCatalog;
use mrbs_entity::user::{CreateUser, PrivilegeLevel};
use mrbs_service::{ActivityRecorder, BookingRequest, BookingService, RequestContext};

struct PgTestApp {
    pool: DatabasePool,
    users: UserRepository,
    service: BookingService,
}

impl PgTestApp {
    async fn new() -> Self {
        let url = std::env::var("MRBS_TEST_DATABASE_URL")
            .expect("MRBS_TEST_DATABASE_URL must be set for Postgres tests");
        let pool = DatabasePool::connect(&DatabaseConfig {
            url,
            max_connections: 16,
            min_connections: 1,
            connect_timeout_seconds: 10,
            idle_timeout_seconds: 60,
        })
        .await
        .expect("Failed to connect to test database");
        run_migrations(pool.pool()).await.expect("Failed to run migrations");

        let users = UserRepository::new(pool.pool().clone());
        let bookings = BookingRepository::new(pool.pool().clone(), Duration::from_secs(5));
        let service = BookingService::new(
            Arc::new(bookings),
            Arc::new(RoomCatalog::builtin()),
            BookingPolicy::default(),
            ActivityRecorder::new(Arc::new(users.clone())),
        );
        Self {
            pool,
            users,
            service,
        }
    }

    /// Remove leftovers from earlier runs on `day`.
    async fn clear_day(&self, day: u32) {
        sqlx::query(
            "DELETE FROM bookings WHERE start_time >= $1::date AND start_time < $1::date + 2",
        )
        .bind(format!("2099-01-{day:02}"))
        .execute(self.pool.pool())
        .await
        .expect("Failed to clear test day");
    }

    async fn user(&self, level: PrivilegeLevel) -> RequestContext {
        let name = format!("it-{}", mrbs_core::types::UserId::new());
        let user = self
            .users
            .create(&CreateUser {
                display_name: name.clone(),
                name,
                privilege: level,
            })
            .await
            .expect("Failed to create user");
        RequestContext::new(user.id, level)
    }
}

/// A far-future day per test keeps tests from seeing each other's rows.
fn request(day: u32, room: i32, start: &str, slots: u32) -> BookingRequest {
    BookingRequest {
        room_id: RoomId(room),
        start_time: format!("2099-01-{day:02} {start}"),
        duration_slots: slots,
        title: "Postgres".to_string(),
        description: Some("integration".to_string()),
    }
}

#[tokio::test]
#[ignore = "requires MRBS_TEST_DATABASE_URL"]
async fn test_pg_admission_rules() {
    let app = PgTestApp::new().await;
    app.clear_day(2).await;
    let a = app.user(PrivilegeLevel::Standard).await;
    let b = app.user(PrivilegeLevel::Standard).await;

    let booking = app
        .service
        .create(&a, request(2, 3, "08:00", 2))
        .await
        .expect("admitted")
        .booking;

    let err = app.service.create(&b, request(2, 3, "08:30", 2)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::RoomConflict);

    let err = app.service.create(&a, request(2, 4, "08:30", 1)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::UserConflict);

    let err = app.service.create(&a, request(2, 5, "09:00", 7)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::QuotaExceeded);

    let edited = app
        .service
        .edit(&a, booking.id, request(2, 3, "08:00", 2))
        .await
        .expect("edit onto its own slot");
    assert_eq!(edited.booking.id, booking.id);

    let err = app.service.delete(&b, booking.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    app.service.delete(&a, booking.id).await.expect("owner delete");

    app.service.activity().drain().await;
    let marked = app.users.find_by_id(a.user_id).await.unwrap().unwrap();
    assert!(marked.last_active_at.is_some());
    app.pool.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires MRBS_TEST_DATABASE_URL"]
async fn test_pg_race_admits_exactly_one() {
    let app = PgTestApp::new().await;
    app.clear_day(3).await;
    let mut contenders = Vec::new();
    for _ in 0..8 {
        contenders.push(app.user(PrivilegeLevel::Standard).await);
    }

    let tasks = contenders.into_iter().map(|ctx| {
        let service = app.service.clone();
        tokio::spawn(async move { service.create(&ctx, request(3, 7, "10:00", 2)).await })
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
    app.pool.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires MRBS_TEST_DATABASE_URL"]
async fn test_pg_user_overlap_race_across_rooms() {
    let app = PgTestApp::new().await;
    app.clear_day(4).await;
    let alice = app.user(PrivilegeLevel::Standard).await;

    // Different rooms, so only the per-user lock keeps these apart.
    let tasks = [4, 5].map(|room| {
        let service = app.service.clone();
        tokio::spawn(async move { service.create(&alice, request(4, room, "09:00", 2)).await })
    });
    let outcomes: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    let err = outcomes.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(err.kind, ErrorKind::UserConflict);
    app.pool.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires MRBS_TEST_DATABASE_URL"]
async fn test_pg_quota_race_across_rooms() {
    let app = PgTestApp::new().await;
    app.clear_day(5).await;
    let alice = app.user(PrivilegeLevel::Standard).await;

    // Eight disjoint hours in eight rooms; the daily limit allows three.
    let tasks = (1..=8).map(|room| {
        let service = app.service.clone();
        let start = format!("{:02}:00", 8 + room);
        tokio::spawn(async move { service.create(&alice, request(5, room, &start, 2)).await })
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

    let held: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(EXTRACT(EPOCH FROM (end_time - start_time))), 0)::BIGINT \
         FROM bookings WHERE user_id = $1",
    )
    .bind(alice.user_id)
    .fetch_one(app.pool.pool())
    .await
    .unwrap();
    assert_eq!(held, 10800);
    app.pool.close().await;
}
