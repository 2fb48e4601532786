//! Classification of sqlx failures into the engine's error taxonomy.

use mrbs_core::error::{AppError, ErrorKind};

/// `lock_not_available`, raised when `lock_timeout` expires.
const LOCK_NOT_AVAILABLE: &str = "55P03";
/// `serialization_failure`.
const SERIALIZATION_FAILURE: &str = "40001";
/// `deadlock_detected`.
const DEADLOCK_DETECTED: &str = "40P01";

/// Wrap a sqlx error with context, mapping lock contention to
/// [`ErrorKind::Busy`] and connectivity loss to [`ErrorKind::StoreUnavailable`].
pub fn db_error(context: &str, err: sqlx::Error) -> AppError {
    let kind = classify(&err);
    AppError::with_source(kind, format!("{context}: {err}"), err)
}

/// Error kind for a sqlx error.
pub fn classify(err: &sqlx::Error) -> ErrorKind {
    match err {
        sqlx::Error::PoolTimedOut => ErrorKind::Busy,
        sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
            ErrorKind::StoreUnavailable
        }
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some(LOCK_NOT_AVAILABLE | SERIALIZATION_FAILURE | DEADLOCK_DETECTED) => {
                ErrorKind::Busy
            }
            // Class 08: connection exception.
            Some(code) if code.starts_with("08") => ErrorKind::StoreUnavailable,
            _ => ErrorKind::Database,
        },
        _ => ErrorKind::Database,
    }
}
