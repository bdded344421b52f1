//! Default collaborator implementations backed by `tracing` and the terminal.

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};

use glowbook_core::notify::{
    Diagnostics, NotificationError, NotificationScheduler, Reminder, Toast, ToastKind, Toaster,
};

/// Diagnostics sink that emits `tracing` events under the
/// `glowbook::diagnostics` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn log_event(&self, name: &str, params: serde_json::Value) {
        tracing::info!(target: "glowbook::diagnostics", event = name, %params, "Event");
    }

    fn record_error(&self, error: &(dyn std::error::Error + 'static)) {
        tracing::error!(target: "glowbook::diagnostics", error = %error, "Recorded error");
    }
}

/// Scheduler that logs reminders instead of handing them to a device.
///
/// Reminders in the past are refused like a device scheduler would.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingScheduler;

impl LoggingScheduler {
    fn check(reminder: &Reminder, now: NaiveDateTime) -> Result<(), NotificationError> {
        if reminder.at <= now {
            return Err(NotificationError::InPast);
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationScheduler for LoggingScheduler {
    async fn schedule(&self, reminder: &Reminder) -> Result<(), NotificationError> {
        Self::check(reminder, Local::now().naive_local())?;
        tracing::info!(at = %reminder.at, title = %reminder.title, body = %reminder.body, "Reminder scheduled");
        Ok(())
    }
}

/// Toaster that prints to standard error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleToaster;

impl ConsoleToaster {
    fn render(toast: &Toast) -> String {
        let label = match toast.kind {
            ToastKind::Success => "ok",
            ToastKind::Error => "error",
        };
        match &toast.description {
            Some(description) => format!("[{label}] {}: {description}", toast.message),
            None => format!("[{label}] {}", toast.message),
        }
    }
}

impl Toaster for ConsoleToaster {
    fn show_toast(&self, toast: Toast) {
        eprintln!("{}", Self::render(&toast));
    }
}
