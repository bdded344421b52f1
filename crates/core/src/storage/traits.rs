use async_trait::async_trait;
use uuid::Uuid;

use crate::appointment::{Appointment, NewAppointment, UpdateAppointmentRequest};
use crate::catalog::{Professional, Service};

use super::Result;

/// Remote appointment storage, scoped to the authenticated user.
#[async_trait]
pub trait AppointmentBackend: Send + Sync {
    /// Lists the user's appointments ordered by date and time ascending.
    async fn list(&self, user_id: Uuid) -> Result<Vec<Appointment>>;

    /// Inserts a new appointment and returns the stored row with its ID.
    async fn insert(&self, appointment: &NewAppointment) -> Result<Appointment>;

    /// Applies a partial update and returns the stored row.
    async fn update(&self, id: Uuid, update: &UpdateAppointmentRequest) -> Result<Appointment>;
}

/// Remote catalog of bookable services and professionals.
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    /// Lists every active service.
    async fn list_services(&self) -> Result<Vec<Service>>;

    /// Lists every active professional.
    async fn list_professionals(&self) -> Result<Vec<Professional>>;
}
