//! Unified application error types for the booking engine.
//!
//! Every crate maps its internal errors into [`AppError`] so that admission
//! rejections, authorization failures and infrastructure faults travel through
//! the `?` operator as one typed outcome. Callers branch on [`ErrorKind`].

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Malformed interval, unknown room, bad duration or missing field.
    Validation,
    /// The room is already reserved for an overlapping interval.
    RoomConflict,
    /// The user already holds an overlapping reservation in another room.
    UserConflict,
    /// The booking would push the user past the daily quota.
    QuotaExceeded,
    /// The caller may not modify the referenced booking.
    Unauthorized,
    /// The referenced booking does not exist (or is not visible to the caller).
    NotFound,
    /// A lock could not be acquired in time. Safe to retry.
    Busy,
    /// The store is unreachable. Safe to retry.
    StoreUnavailable,
    /// Any other database failure.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl ErrorKind {
    /// Whether this kind is an admission rejection (recoverable by choosing
    /// another room or time).
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::RoomConflict | Self::UserConflict | Self::QuotaExceeded
        )
    }

    /// Whether the operation may be retried unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy | Self::StoreUnavailable)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::RoomConflict => write!(f, "ROOM_CONFLICT"),
            Self::UserConflict => write!(f, "USER_CONFLICT"),
            Self::QuotaExceeded => write!(f, "QUOTA_EXCEEDED"),
            Self::Unauthorized => write!(f, "UNAUTHORIZED"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Busy => write!(f, "BUSY"),
            Self::StoreUnavailable => write!(f, "STORE_UNAVAILABLE"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a room conflict rejection.
    pub fn room_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RoomConflict, message)
    }

    /// Create a user conflict rejection.
    pub fn user_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UserConflict, message)
    }

    /// Create a quota rejection.
    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::QuotaExceeded, message)
    }

    /// Create an authorization error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a lock-timeout error.
    pub fn busy(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Busy, message)
    }

    /// Create a store-unavailable error.
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StoreUnavailable, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Shorthand for `self.kind.is_rejection()`.
    pub fn is_rejection(&self) -> bool {
        self.kind.is_rejection()
    }

    /// Shorthand for `self.kind.is_retryable()`.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = err.field_errors().keys().map(|k| k.to_string()).collect();
        fields.sort_unstable();
        Self::with_source(
            ErrorKind::Validation,
            format!("Invalid fields: {}", fields.join(", ")),
            err,
        )
    }
}
