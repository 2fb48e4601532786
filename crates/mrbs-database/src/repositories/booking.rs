//! Booking repository implementation.
//!
//! Admission transactions run at read-committed isolation and serialize
//! through transaction-scoped advisory locks taken before any read: one
//! per room, plus one per standard user. A contender that arrives second
//! therefore reads the winner's committed row and is rejected, instead of
//! both passing a check-then-act race. `lock_timeout` bounds the wait.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use mrbs_core::result::AppResult;
use mrbs_core::types::{BookingId, RoomId, TimeInterval, UserId};
use mrbs_entity::booking::{Booking, BookingListing, NewBooking};

use crate::error::db_error;
use crate::store::{AdmissionProbe, AdmissionTx, BookingStore, ProbeTally};

/// Advisory lock namespace for rooms.
const ROOM_LOCK_SPACE: i32 = 0x6d72_0001;
/// Advisory lock namespace for users.
const USER_LOCK_SPACE: i32 = 0x6d72_0002;

/// Steps 2-4 of admission in one round trip.
const TALLY_SQL: &str = "\
SELECT \
    COALESCE(SUM(CASE WHEN room_id = $1 AND start_time < $3 AND end_time > $2 \
        THEN 1 ELSE 0 END), 0)::BIGINT AS room_overlaps, \
    COALESCE(SUM(CASE WHEN $5 AND user_id = $4 AND start_time < $3 AND end_time > $2 \
        THEN 1 ELSE 0 END), 0)::BIGINT AS user_overlaps, \
    COALESCE(SUM(CASE WHEN user_id = $4 AND start_time >= $6 AND end_time <= $7 \
        THEN EXTRACT(EPOCH FROM (end_time - start_time)) ELSE 0 END), 0)::BIGINT AS existing_seconds \
FROM bookings \
WHERE ($8::uuid IS NULL OR id <> $8) \
  AND ((start_time < $3 AND end_time > $2 AND (room_id = $1 OR user_id = $4)) \
       OR (user_id = $4 AND start_time >= $6 AND end_time <= $7))";

/// PostgreSQL-backed booking store.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: PgPool,
    lock_timeout: Duration,
}

impl BookingRepository {
    /// Create a new booking repository.
    pub fn new(pool: PgPool, lock_timeout: Duration) -> Self {
        Self { pool, lock_timeout }
    }
}

#[async_trait]
impl BookingStore for BookingRepository {
    async fn begin(&self) -> AppResult<Box<dyn AdmissionTx>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin admission transaction", e))?;

        // SET LOCAL does not accept bind parameters.
        let timeout_ms = self.lock_timeout.as_millis().max(1);
        sqlx::query(&format!("SET LOCAL lock_timeout = '{timeout_ms}ms'"))
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to set lock timeout", e))?;

        Ok(Box::new(PgAdmissionTx { tx }))
    }

    async fn find_by_id(&self, id: BookingId) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find booking", e))
    }

    async fn delete(&self, id: BookingId, owner: Option<UserId>) -> AppResult<u64> {
        let result =
            sqlx::query("DELETE FROM bookings WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2)")
                .bind(id)
                .bind(owner)
                .execute(&self.pool)
                .await
                .map_err(|e| db_error("Failed to delete booking", e))?;
        Ok(result.rows_affected())
    }

    async fn list_starting_within(&self, window: &TimeInterval) -> AppResult<Vec<BookingListing>> {
        sqlx::query_as::<_, BookingListing>(
            "SELECT b.*, u.display_name AS booked_by, u.name AS booked_by_username \
             FROM bookings b \
             INNER JOIN users u ON b.user_id = u.id \
             WHERE b.start_time >= $1 AND b.start_time < $2 \
             ORDER BY b.start_time, b.room_id",
        )
        .bind(window.start())
        .bind(window.end())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list bookings", e))
    }
}

/// An open PostgreSQL admission transaction. Dropping it rolls back.
pub struct PgAdmissionTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl AdmissionTx for PgAdmissionTx {
    async fn lock_scope(&mut self, room_id: RoomId, user_id: Option<UserId>) -> AppResult<()> {
        // Room before user, so two admissions can never wait on each other
        // in opposite order.
        sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(ROOM_LOCK_SPACE)
            .bind(room_id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| db_error("Failed to lock room", e))?;

        if let Some(user_id) = user_id {
            sqlx::query("SELECT pg_advisory_xact_lock($1, hashtext($2::uuid::text))")
                .bind(USER_LOCK_SPACE)
                .bind(user_id)
                .execute(&mut *self.tx)
                .await
                .map_err(|e| db_error("Failed to lock user", e))?;
        }
        Ok(())
    }

    async fn count_room_overlaps(
        &mut self,
        room_id: RoomId,
        interval: &TimeInterval,
        exclude: Option<BookingId>,
    ) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM bookings \
             WHERE room_id = $1 AND start_time < $3 AND end_time > $2 \
               AND ($4::uuid IS NULL OR id <> $4)",
        )
        .bind(room_id)
        .bind(interval.start())
        .bind(interval.end())
        .bind(exclude)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to count room overlaps", e))
    }

    async fn count_user_overlaps(
        &mut self,
        user_id: UserId,
        interval: &TimeInterval,
        exclude: Option<BookingId>,
    ) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM bookings \
             WHERE user_id = $1 AND start_time < $3 AND end_time > $2 \
               AND ($4::uuid IS NULL OR id <> $4)",
        )
        .bind(user_id)
        .bind(interval.start())
        .bind(interval.end())
        .bind(exclude)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to count user overlaps", e))
    }

    async fn seconds_within(
        &mut self,
        user_id: UserId,
        window: &TimeInterval,
        exclude: Option<BookingId>,
    ) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(EXTRACT(EPOCH FROM (end_time - start_time))), 0)::BIGINT \
             FROM bookings \
             WHERE user_id = $1 AND start_time >= $2 AND end_time <= $3 \
               AND ($4::uuid IS NULL OR id <> $4)",
        )
        .bind(user_id)
        .bind(window.start())
        .bind(window.end())
        .bind(exclude)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to sum booked seconds", e))
    }

    async fn tally(&mut self, probe: &AdmissionProbe) -> AppResult<ProbeTally> {
        let tally = sqlx::query_as::<_, ProbeTally>(TALLY_SQL)
            .bind(probe.room_id)
            .bind(probe.interval.start())
            .bind(probe.interval.end())
            .bind(probe.user_id)
            .bind(probe.check_user)
            .bind(probe.quota_window.map(|w| w.start()))
            .bind(probe.quota_window.map(|w| w.end()))
            .bind(probe.exclude)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| db_error("Failed to evaluate admission", e))?;

        // Without a quota window the seconds aggregate matches nothing.
        debug!(?tally, room_id = %probe.room_id, user_id = %probe.user_id, "Admission tally");
        Ok(tally)
    }

    async fn insert(&mut self, booking: &Booking) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO bookings (id, user_id, room_id, start_time, end_time, title, description, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(booking.id)
        .bind(booking.user_id)
        .bind(booking.room_id)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(&booking.title)
        .bind(&booking.description)
        .bind(booking.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to insert booking", e))?;
        Ok(())
    }

    async fn update(&mut self, id: BookingId, candidate: &NewBooking) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET room_id = $2, start_time = $3, end_time = $4, \
             title = $5, description = $6 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(candidate.room_id)
        .bind(candidate.interval.start())
        .bind(candidate.interval.end())
        .bind(&candidate.title)
        .bind(&candidate.description)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to update booking", e))
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| db_error("Failed to commit admission", e))
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| db_error("Failed to roll back admission", e))
    }
}

/// Current time truncated to microseconds, the resolution of `TIMESTAMPTZ`,
/// so a booking built in memory compares equal to its stored row.
pub fn db_now() -> chrono::DateTime<Utc> {
    let now = Utc::now();
    chrono::DurationRound::duration_trunc(now, chrono::Duration::microseconds(1)).unwrap_or(now)
}
