//! Appointment lifecycle: the per-session store and its collaborators.

mod manager;

pub use manager::{AppointmentStore, Collaborators, DEFAULT_CACHE_TTL};
