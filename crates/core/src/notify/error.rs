use thiserror::Error;

/// Errors from the notification scheduler. Logged, never escalated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotificationError {
    #[error("Notification permission denied")]
    PermissionDenied,
    #[error("Reminder time is in the past")]
    InPast,
    #[error("Failed to schedule notification: {0}")]
    Failed(String),
}
