//! SQLite error mapping.
//!
//! Maps `tokio_rusqlite::Error` and `rusqlite::Error` to `CacheError` from
//! `glowbook_core::cache`.

use glowbook_core::cache::CacheError;

/// Maps a rusqlite error to a CacheError.
///
/// # Error Mapping
///
/// - `SQLITE_FULL` → `CacheError::QuotaExceeded`
/// - Cannot open, busy or locked → `CacheError::Unavailable`
/// - All other errors → `CacheError::OperationFailed`
fn map_rusqlite_error(err: &rusqlite::Error) -> CacheError {
    match err {
        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.code == rusqlite::ErrorCode::DiskFull =>
        {
            CacheError::QuotaExceeded
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if matches!(
                sqlite_err.code,
                rusqlite::ErrorCode::CannotOpen
                    | rusqlite::ErrorCode::DatabaseBusy
                    | rusqlite::ErrorCode::DatabaseLocked
            ) =>
        {
            CacheError::Unavailable(err.to_string())
        }

        _ => CacheError::OperationFailed(err.to_string()),
    }
}

/// Maps a tokio_rusqlite error to a CacheError.
pub fn map_tokio_rusqlite_error(err: tokio_rusqlite::Error) -> CacheError {
    match &err {
        tokio_rusqlite::Error::Rusqlite(rusqlite_err) => map_rusqlite_error(rusqlite_err),
        tokio_rusqlite::Error::ConnectionClosed | tokio_rusqlite::Error::Close(_) => {
            CacheError::Unavailable("Connection closed unexpectedly".to_string())
        }
        _ => CacheError::OperationFailed(err.to_string()),
    }
}

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
pub fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}
