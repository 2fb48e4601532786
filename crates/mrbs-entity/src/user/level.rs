//! Privilege tiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two privilege tiers the admission policy distinguishes.
///
/// Privileged users skip the per-user overlap and quota checks but are
/// never exempt from room exclusivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivilegeLevel {
    /// Regular user, subject to every check.
    Standard,
    /// Administrator.
    Privileged,
}

impl PrivilegeLevel {
    /// Map the numeric level stored with users (`1` standard, `2`+ privileged).
    pub fn from_level(level: i16) -> Self {
        if level >= 2 {
            Self::Privileged
        } else {
            Self::Standard
        }
    }

    /// Numeric level for storage.
    pub fn as_level(&self) -> i16 {
        match self {
            Self::Standard => 1,
            Self::Privileged => 2,
        }
    }

    /// Whether this tier is privileged.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Privileged)
    }

    /// Return the tier as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Privileged => "privileged",
        }
    }
}

impl fmt::Display for PrivilegeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PrivilegeLevel {
    type Err = mrbs_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" | "user" | "1" => Ok(Self::Standard),
            "privileged" | "admin" | "2" => Ok(Self::Privileged),
            _ => Err(mrbs_core::AppError::validation(format!(
                "Invalid privilege level: '{s}'. Expected standard or privileged"
            ))),
        }
    }
}
