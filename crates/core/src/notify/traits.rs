use async_trait::async_trait;

use super::error::NotificationError;
use super::types::{Reminder, Toast};

/// Schedules local reminders on the device.
#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    async fn schedule(&self, reminder: &Reminder) -> Result<(), NotificationError>;
}

/// Analytics and crash reporting sink.
///
/// Calls must return quickly and never fail.
pub trait Diagnostics: Send + Sync {
    /// Records a named event with structured parameters.
    fn log_event(&self, name: &str, params: serde_json::Value);

    /// Records a non-fatal error.
    fn record_error(&self, error: &(dyn std::error::Error + 'static));
}

/// Shows transient feedback to the user.
pub trait Toaster: Send + Sync {
    fn show_toast(&self, toast: Toast);
}
