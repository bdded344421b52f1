use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::AppointmentStatus;

/// A booking of a service with a provider, as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_id: String,
    pub provider_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Creates a scheduled appointment with a fresh ID and current timestamps.
    pub fn new(
        user_id: Uuid,
        service_id: impl Into<String>,
        provider_id: impl Into<String>,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            service_id: service_id.into(),
            provider_id: provider_id.into(),
            date,
            time,
            status: AppointmentStatus::Scheduled,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Combined local date and time of the appointment.
    pub fn date_time(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    pub fn with_status(mut self, status: AppointmentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// A validated appointment that has not been persisted yet.
///
/// Carries no ID: the backend assigns one on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub user_id: Uuid,
    pub service_id: String,
    pub provider_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewAppointment {
    pub fn date_time(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Materializes a stored row from this draft.
    pub fn into_appointment(self, id: Uuid, now: DateTime<Utc>) -> Appointment {
        Appointment {
            id,
            user_id: self.user_id,
            service_id: self.service_id,
            provider_id: self.provider_id,
            date: self.date,
            time: self.time,
            status: self.status,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}
