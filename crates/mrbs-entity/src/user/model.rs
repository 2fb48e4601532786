//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use mrbs_core::types::UserId;

use super::level::PrivilegeLevel;

/// The slice of a user record the engine reads: display metadata for
/// listings and the last-activity marker.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Login name.
    pub name: String,
    /// Display name shown on listings.
    pub display_name: String,
    /// Numeric privilege level.
    pub level: i16,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// Last successful booking activity.
    pub last_active_at: Option<DateTime<Utc>>,
}

impl User {
    /// Privilege tier derived from the numeric level.
    pub fn privilege(&self) -> PrivilegeLevel {
        PrivilegeLevel::from_level(self.level)
    }
}

/// Data required to register a user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Login name.
    pub name: String,
    /// Display name shown on listings.
    pub display_name: String,
    /// Privilege tier.
    pub privilege: PrivilegeLevel,
}
