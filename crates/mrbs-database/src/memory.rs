//! In-memory booking store using a Tokio mutex for single-process use.
//!
//! Every admission transaction holds one store-wide lock from `begin` until
//! commit or drop, which is a coarser scope than per-room but gives the
//! same serialization guarantee. Writes are staged on the transaction and
//! applied only on commit.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;

use mrbs_core::error::AppError;
use mrbs_core::result::AppResult;
use mrbs_core::types::{BookingId, RoomId, TimeInterval, UserId};
use mrbs_entity::booking::{Booking, BookingListing, NewBooking};
use mrbs_entity::user::{CreateUser, User};

use crate::store::{ActivityMarker, AdmissionTx, BookingStore};

type Timeline = BTreeMap<BookingId, Booking>;

/// In-memory implementation of [`BookingStore`] and [`ActivityMarker`].
#[derive(Debug, Clone)]
pub struct MemoryBookingStore {
    /// Committed bookings.
    bookings: Arc<Mutex<Timeline>>,
    /// Registered users.
    users: Arc<RwLock<HashMap<UserId, User>>>,
    /// How long `begin` waits for the store lock.
    lock_timeout: Duration,
    /// Simulated connectivity.
    available: Arc<AtomicBool>,
}

impl MemoryBookingStore {
    /// Create an empty store with a three-second lock timeout.
    pub fn new() -> Self {
        Self::with_lock_timeout(Duration::from_secs(3))
    }

    /// Create an empty store with the given lock timeout.
    pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
        Self {
            bookings: Arc::new(Mutex::new(BTreeMap::new())),
            users: Arc::new(RwLock::new(HashMap::new())),
            lock_timeout,
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Register a user so listings can show their names.
    pub async fn register_user(&self, data: CreateUser) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.name.eq_ignore_ascii_case(&data.name))
        {
            return Err(AppError::validation(format!(
                "User name '{}' already exists",
                data.name
            )));
        }

        let user = User {
            id: UserId::new(),
            name: data.name,
            display_name: data.display_name,
            level: data.privilege.as_level(),
            created_at: Utc::now(),
            last_active_at: None,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    /// Look up a registered user.
    pub async fn user(&self, id: UserId) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }

    /// Toggle simulated connectivity. While unavailable every operation
    /// fails with `StoreUnavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of committed bookings.
    pub async fn len(&self) -> usize {
        self.bookings.lock().await.len()
    }

    /// Whether no bookings are committed.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn ensure_available(&self) -> AppResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::store_unavailable("In-memory store is offline"))
        }
    }
}

impl Default for MemoryBookingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn begin(&self) -> AppResult<Box<dyn AdmissionTx>> {
        self.ensure_available()?;

        let guard = tokio::time::timeout(self.lock_timeout, self.bookings.clone().lock_owned())
            .await
            .map_err(|_| {
                AppError::busy(format!(
                    "Timed out after {}ms waiting for the booking lock",
                    self.lock_timeout.as_millis()
                ))
            })?;

        Ok(Box::new(MemoryTx {
            committed: guard,
            staged: BTreeMap::new(),
        }))
    }

    async fn find_by_id(&self, id: BookingId) -> AppResult<Option<Booking>> {
        self.ensure_available()?;
        Ok(self.bookings.lock().await.get(&id).cloned())
    }

    async fn delete(&self, id: BookingId, owner: Option<UserId>) -> AppResult<u64> {
        self.ensure_available()?;
        let mut bookings = self.bookings.lock().await;

        let matches = bookings
            .get(&id)
            .is_some_and(|b| owner.is_none_or(|user_id| b.is_owned_by(user_id)));
        if !matches {
            return Ok(0);
        }
        bookings.remove(&id);
        Ok(1)
    }

    async fn list_starting_within(&self, window: &TimeInterval) -> AppResult<Vec<BookingListing>> {
        self.ensure_available()?;
        let bookings = self.bookings.lock().await;
        let users = self.users.read().await;

        let mut rows: Vec<BookingListing> = bookings
            .values()
            .filter(|b| window.contains_instant(b.start_time))
            .map(|b| {
                let (booked_by, booked_by_username) = match users.get(&b.user_id) {
                    Some(user) => (user.display_name.clone(), user.name.clone()),
                    None => (b.user_id.to_string(), b.user_id.to_string()),
                };
                BookingListing {
                    booking: b.clone(),
                    booked_by,
                    booked_by_username,
                }
            })
            .collect();

        rows.sort_by_key(|row| (row.booking.start_time, row.booking.room_id));
        Ok(rows)
    }
}

#[async_trait]
impl ActivityMarker for MemoryBookingStore {
    async fn touch_last_active(&self, user_id: UserId) -> AppResult<()> {
        self.ensure_available()?;
        let mut users = self.users.write().await;
        match users.get_mut(&user_id) {
            Some(user) => {
                user.last_active_at = Some(Utc::now());
                Ok(())
            }
            None => Err(AppError::not_found(format!("User {user_id} not found"))),
        }
    }
}

/// An open in-memory admission transaction.
struct MemoryTx {
    committed: OwnedMutexGuard<Timeline>,
    staged: Timeline,
}

impl MemoryTx {
    /// Committed bookings overlaid with this transaction's staged writes.
    fn visible(&self) -> impl Iterator<Item = &Booking> {
        self.committed
            .values()
            .filter(move |b| !self.staged.contains_key(&b.id))
            .chain(self.staged.values())
    }

    fn overlapping<'a>(
        &'a self,
        interval: &'a TimeInterval,
        exclude: Option<BookingId>,
    ) -> impl Iterator<Item = &'a Booking> {
        self.visible()
            .filter(move |b| Some(b.id) != exclude)
            .filter(move |b| b.start_time < interval.end() && interval.start() < b.end_time)
    }
}

#[async_trait]
impl AdmissionTx for MemoryTx {
    async fn lock_scope(&mut self, _room_id: RoomId, _user_id: Option<UserId>) -> AppResult<()> {
        // Already exclusive since `begin`.
        Ok(())
    }

    async fn count_room_overlaps(
        &mut self,
        room_id: RoomId,
        interval: &TimeInterval,
        exclude: Option<BookingId>,
    ) -> AppResult<i64> {
        Ok(self
            .overlapping(interval, exclude)
            .filter(|b| b.room_id == room_id)
            .count() as i64)
    }

    async fn count_user_overlaps(
        &mut self,
        user_id: UserId,
        interval: &TimeInterval,
        exclude: Option<BookingId>,
    ) -> AppResult<i64> {
        Ok(self
            .overlapping(interval, exclude)
            .filter(|b| b.user_id == user_id)
            .count() as i64)
    }

    async fn seconds_within(
        &mut self,
        user_id: UserId,
        window: &TimeInterval,
        exclude: Option<BookingId>,
    ) -> AppResult<i64> {
        Ok(self
            .visible()
            .filter(|b| b.user_id == user_id && Some(b.id) != exclude)
            .filter(|b| b.start_time >= window.start() && b.end_time <= window.end())
            .map(|b| (b.end_time - b.start_time).num_seconds())
            .sum())
    }

    async fn insert(&mut self, booking: &Booking) -> AppResult<()> {
        if self.visible().any(|b| b.id == booking.id) {
            return Err(AppError::database(format!(
                "Booking {} already exists",
                booking.id
            )));
        }
        self.staged.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn update(&mut self, id: BookingId, candidate: &NewBooking) -> AppResult<Option<Booking>> {
        let Some(current) = self.visible().find(|b| b.id == id).cloned() else {
            return Ok(None);
        };

        let updated = Booking {
            room_id: candidate.room_id,
            start_time: candidate.interval.start(),
            end_time: candidate.interval.end(),
            title: candidate.title.clone(),
            description: candidate.description.clone(),
            ..current
        };
        self.staged.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryTx {
            mut committed,
            staged,
        } = *self;
        debug!(writes = staged.len(), "Committing in-memory admission");
        committed.extend(staged);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}
