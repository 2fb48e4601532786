//! Best-effort last-activity marker.
//!
//! Marking runs on a detached task after the operation has returned. A
//! failure is logged and never reaches the caller.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinSet;
use tracing::{debug, warn};

use mrbs_core::types::UserId;
use mrbs_database::store::ActivityMarker;

/// Dispatches last-activity updates off the request path.
#[derive(Clone)]
pub struct ActivityRecorder {
    marker: Option<Arc<dyn ActivityMarker>>,
    pending: Arc<Mutex<JoinSet<()>>>,
}

impl std::fmt::Debug for ActivityRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityRecorder")
            .field("enabled", &self.marker.is_some())
            .finish()
    }
}

impl ActivityRecorder {
    /// Recorder writing through `marker`.
    pub fn new(marker: Arc<dyn ActivityMarker>) -> Self {
        Self {
            marker: Some(marker),
            pending: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    /// Recorder that does nothing.
    pub fn disabled() -> Self {
        Self {
            marker: None,
            pending: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    /// Mark `user_id` as active. Returns immediately. Must be called from
    /// within a Tokio runtime.
    pub fn record(&self, user_id: UserId) {
        let Some(marker) = self.marker.clone() else {
            return;
        };

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        // Reap finished tasks so the set does not grow without bound.
        while pending.try_join_next().is_some() {}

        pending.spawn(async move {
            match marker.touch_last_active(user_id).await {
                Ok(()) => debug!(user_id = %user_id, "Last activity updated"),
                Err(e) => warn!(user_id = %user_id, error = %e, "Failed to update last activity"),
            }
        });
    }

    /// Wait for every dispatched update to finish. Used on shutdown.
    pub async fn drain(&self) {
        let mut pending = {
            let mut guard = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *guard)
        };
        while pending.join_next().await.is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mrbs_core::error::AppError;
    use mrbs_core::result::AppResult;
    use mrbs_database::MemoryBookingStore;
    use mrbs_entity::user::{CreateUser, PrivilegeLevel};

    struct FailingMarker;

    #[async_trait]
    impl ActivityMarker for FailingMarker {
        async fn touch_last_active(&self, _user_id: UserId) -> AppResult<()> {
            Err(AppError::store_unavailable("down"))
        }
    }

    #[tokio::test]
    async fn test_record_updates_marker() {
        let store = MemoryBookingStore::new();
        let user = store
            .register_user(CreateUser {
                name: "ada".to_string(),
                display_name: "Ada".to_string(),
                privilege: PrivilegeLevel::Standard,
            })
            .await
            .unwrap();

        let recorder = ActivityRecorder::new(Arc::new(store.clone()));
        recorder.record(user.id);
        recorder.drain().await;

        assert!(store.user(user.id).await.unwrap().last_active_at.is_some());
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let recorder = ActivityRecorder::new(Arc::new(FailingMarker));
        recorder.record(UserId::new());
        recorder.drain().await;

        ActivityRecorder::disabled().record(UserId::new());
    }
}
