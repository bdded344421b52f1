mod error;
mod operations;
mod requests;
mod status;
mod types;
mod views;

pub use error::{AppointmentError, LifecycleError, Result};
pub use operations::{
    find_appointment, guard_transition, sort_by_schedule, upsert_appointment, validate_create,
    validate_update, MAX_NOTES_LEN,
};
pub use requests::{CreateAppointmentRequest, UpdateAppointmentRequest};
pub use status::AppointmentStatus;
pub use types::{Appointment, NewAppointment};
pub use views::{
    count_by_status, filter_by_date, filter_by_provider, filter_by_service, filter_by_status,
    is_upcoming, past, upcoming,
};
