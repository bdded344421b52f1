use thiserror::Error;
use uuid::Uuid;

use crate::storage::BackendError;

use super::status::AppointmentStatus;

/// Errors that can occur when validating or transitioning appointments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppointmentError {
    #[error("Service ID is required")]
    MissingServiceId,
    #[error("Provider ID is required")]
    MissingProviderId,
    #[error("Appointment date is required")]
    MissingDate,
    #[error("Appointment time is required")]
    MissingTime,
    #[error("Notes too long (max 1000 characters)")]
    NotesTooLong,
    #[error("Update contains no changes")]
    EmptyUpdate,
    #[error("Unknown appointment status: {0}")]
    UnknownStatus(String),
    #[error("Cannot move appointment from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
}

/// Errors surfaced by appointment lifecycle operations.
///
/// `Validation`, `InvalidTransition` and `NotFound` are raised before any
/// local mutation. `Remote` is raised after the optimistic mutation has been
/// rolled back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Invalid appointment: {0}")]
    Validation(AppointmentError),
    #[error("Cannot move appointment from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
    #[error("Appointment not found: {0}")]
    NotFound(Uuid),
    #[error("Backend request failed: {0}")]
    Remote(#[from] BackendError),
}

impl LifecycleError {
    /// Returns a short machine-friendly name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            LifecycleError::Validation(_) => "validation",
            LifecycleError::InvalidTransition { .. } => "invalid_transition",
            LifecycleError::NotFound(_) => "not_found",
            LifecycleError::Remote(_) => "remote",
        }
    }
}

impl From<AppointmentError> for LifecycleError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::InvalidTransition { from, to } => {
                LifecycleError::InvalidTransition { from, to }
            }
            other => LifecycleError::Validation(other),
        }
    }
}

/// Result type for lifecycle operations.
pub type Result<T> = std::result::Result<T, LifecycleError>;
