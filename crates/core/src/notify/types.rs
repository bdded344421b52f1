use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::appointment::Appointment;

/// A local notification to be delivered at `at` (device local time).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub title: String,
    pub body: String,
    pub at: NaiveDateTime,
}

impl Reminder {
    /// Builds the reminder for an appointment, `lead` before it starts.
    ///
    /// Returns `None` if the reminder time falls outside the representable
    /// date range.
    pub fn for_appointment(appointment: &Appointment, lead: Duration) -> Option<Self> {
        let at = appointment.date_time().checked_sub_signed(lead)?;
        Some(Self {
            title: "Upcoming appointment".to_string(),
            body: format!(
                "Your appointment is on {} at {}",
                appointment.date.format("%b %-d"),
                appointment.time.format("%H:%M")
            ),
            at,
        })
    }
}

/// Visual style of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

/// Transient user feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
            description: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
