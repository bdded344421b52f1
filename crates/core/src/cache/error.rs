use thiserror::Error;

/// Errors raised by a storage medium.
///
/// These never reach callers of the keyed store: it logs them and degrades
/// to a miss or a dropped write.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Storage operation failed: {0}")]
    OperationFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Storage quota exceeded")]
    QuotaExceeded,
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

/// Result type for storage medium operations.
pub type Result<T> = std::result::Result<T, CacheError>;
