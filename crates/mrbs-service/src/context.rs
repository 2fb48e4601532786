//! Identity of the caller, as handed over by the identity layer.

use serde::{Deserialize, Serialize};

use mrbs_core::types::UserId;
use mrbs_entity::user::PrivilegeLevel;

/// Who is acting on a mutating call.
///
/// The engine does not authenticate; it trusts whatever the calling layer
/// puts here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user's ID.
    pub user_id: UserId,
    /// The acting user's privilege tier.
    pub level: PrivilegeLevel,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: UserId, level: PrivilegeLevel) -> Self {
        Self { user_id, level }
    }

    /// Context for a standard user.
    pub fn standard(user_id: UserId) -> Self {
        Self::new(user_id, PrivilegeLevel::Standard)
    }

    /// Context for a privileged user.
    pub fn privileged(user_id: UserId) -> Self {
        Self::new(user_id, PrivilegeLevel::Privileged)
    }

    /// Returns whether the caller is privileged.
    pub fn is_privileged(&self) -> bool {
        self.level.is_privileged()
    }

    /// Whether the caller may modify a booking owned by `owner`.
    pub fn can_modify(&self, owner: UserId) -> bool {
        self.is_privileged() || self.user_id == owner
    }
}
