//! Request types for appointment operations.
//!
//! Pure data types shared by the lifecycle manager and the backends.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::serde::{deserialize_optional_date, deserialize_optional_string, deserialize_optional_time};

use super::status::AppointmentStatus;
use super::types::Appointment;

/// Booking input as submitted by the client.
///
/// Every field is optional here so that a half-filled form can be reported
/// field by field by validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub service_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub provider_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_time")]
    pub time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub notes: Option<String>,
}

impl CreateAppointmentRequest {
    /// Creates a complete request.
    pub fn new(
        service_id: impl Into<String>,
        provider_id: impl Into<String>,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Self {
        Self {
            service_id: Some(service_id.into()),
            provider_id: Some(provider_id.into()),
            date: Some(date),
            time: Some(time),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Partial update of an appointment. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl UpdateAppointmentRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// An update that only changes the status.
    pub fn status(status: AppointmentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_provider_id(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = Some(provider_id.into());
        self
    }

    /// Returns true if the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.service_id.is_none()
            && self.provider_id.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.status.is_none()
            && self.notes.is_none()
    }

    /// Merges this update into an appointment. Timestamps are left for the
    /// server to assign.
    pub fn apply_to(&self, appointment: &mut Appointment) {
        if let Some(service_id) = &self.service_id {
            appointment.service_id = service_id.clone();
        }
        if let Some(provider_id) = &self.provider_id {
            appointment.provider_id = provider_id.clone();
        }
        if let Some(date) = self.date {
            appointment.date = date;
        }
        if let Some(time) = self.time {
            appointment.time = time;
        }
        if let Some(status) = self.status {
            appointment.status = status;
        }
        if let Some(notes) = &self.notes {
            appointment.notes = Some(notes.clone());
        }
    }
}
