//! In-memory backend implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use glowbook_core::appointment::{
    sort_by_schedule, Appointment, NewAppointment, UpdateAppointmentRequest,
};
use glowbook_core::catalog::{Professional, Service};
use glowbook_core::storage::{AppointmentBackend, BackendError, CatalogBackend, Result};

/// In-memory backend used by the unit tests.
///
/// Uses collections wrapped in `Arc<RwLock<_>>` for thread-safe access.
/// Data is not persisted and will be lost when the backend is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    appointments: Arc<RwLock<HashMap<Uuid, Appointment>>>,
    services: Arc<RwLock<Vec<Service>>>,
    professionals: Arc<RwLock<Vec<Professional>>>,
}

impl InMemoryBackend {
    /// Creates a new empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a row as-is, keeping its ID and timestamps.
    pub async fn seed_appointment(&self, appointment: Appointment) {
        self.appointments
            .write()
            .await
            .insert(appointment.id, appointment);
    }

    pub async fn seed_services(&self, services: Vec<Service>) {
        *self.services.write().await = services;
    }

    pub async fn seed_professionals(&self, professionals: Vec<Professional>) {
        *self.professionals.write().await = professionals;
    }

    /// Returns a stored row, bypassing user scoping.
    pub async fn appointment(&self, id: Uuid) -> Option<Appointment> {
        self.appointments.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl AppointmentBackend for InMemoryBackend {
    async fn list(&self, user_id: Uuid) -> Result<Vec<Appointment>> {
        let appointments = self.appointments.read().await;
        let mut rows: Vec<Appointment> = appointments
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        sort_by_schedule(&mut rows);
        Ok(rows)
    }

    async fn insert(&self, appointment: &NewAppointment) -> Result<Appointment> {
        let row = appointment.clone().into_appointment(Uuid::new_v4(), Utc::now());
        self.appointments.write().await.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, update: &UpdateAppointmentRequest) -> Result<Appointment> {
        let mut appointments = self.appointments.write().await;
        let row = appointments
            .get_mut(&id)
            .ok_or_else(|| BackendError::NotFound {
                entity_type: "Appointment",
                id: id.to_string(),
            })?;

        update.apply_to(row);
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}

#[async_trait]
impl CatalogBackend for InMemoryBackend {
    async fn list_services(&self) -> Result<Vec<Service>> {
        Ok(self.services.read().await.clone())
    }

    async fn list_professionals(&self) -> Result<Vec<Professional>> {
        Ok(self.professionals.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use glowbook_core::appointment::AppointmentStatus;

    fn draft(user_id: Uuid, day: u32, hour: u32) -> NewAppointment {
        NewAppointment {
            user_id,
            service_id: "s1".to_string(),
            provider_id: "p1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            status: AppointmentStatus::Scheduled,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_lists_in_schedule_order() {
        let backend = InMemoryBackend::new();
        let user = Uuid::new_v4();

        let later = backend.insert(&draft(user, 3, 9)).await.unwrap();
        let sooner = backend.insert(&draft(user, 1, 15)).await.unwrap();
        backend.insert(&draft(Uuid::new_v4(), 2, 9)).await.unwrap();

        let rows = backend.list(user).await.unwrap();
        let ids: Vec<_> = rows.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![sooner.id, later.id]);
        assert_eq!(later.created_at, later.updated_at);
    }

    #[tokio::test]
    async fn test_update_applies_patch() {
        let backend = InMemoryBackend::new();
        let row = backend.insert(&draft(Uuid::new_v4(), 1, 9)).await.unwrap();

        let updated = backend
            .update(
                row.id,
                &UpdateAppointmentRequest::status(AppointmentStatus::Confirmed),
            )
            .await
            .unwrap();

        assert_eq!(updated.status, AppointmentStatus::Confirmed);
        assert!(updated.updated_at >= row.updated_at);
        assert_eq!(backend.appointment(row.id).await, Some(updated));
    }

    #[tokio::test]
    async fn test_update_missing_row() {
        let backend = InMemoryBackend::new();
        let result = backend
            .update(Uuid::new_v4(), &UpdateAppointmentRequest::new().with_notes("x"))
            .await;

        assert!(matches!(result, Err(BackendError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_catalog_seeding() {
        let backend = InMemoryBackend::new();
        backend
            .seed_professionals(vec![Professional {
                id: "p1".to_string(),
                name: "Marta".to_string(),
                specialty: None,
                rating: Some(4.8),
            }])
            .await;

        assert_eq!(backend.list_professionals().await.unwrap().len(), 1);
        assert!(backend.list_services().await.unwrap().is_empty());
    }
}
