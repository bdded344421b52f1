//! Derived views over an appointment list.
//!
//! Pure functions: they never mutate their input and never perform I/O, so
//! screens can call them on every render. Filters preserve input order.

use chrono::{NaiveDate, NaiveDateTime};

use super::status::AppointmentStatus;
use super::types::Appointment;

/// Appointments with the given status.
pub fn filter_by_status(
    appointments: &[Appointment],
    status: AppointmentStatus,
) -> Vec<&Appointment> {
    appointments.iter().filter(|a| a.status == status).collect()
}

/// Appointments booked on the given calendar date.
pub fn filter_by_date(appointments: &[Appointment], date: NaiveDate) -> Vec<&Appointment> {
    appointments.iter().filter(|a| a.date == date).collect()
}

/// Appointments with the given provider.
pub fn filter_by_provider<'a>(
    appointments: &'a [Appointment],
    provider_id: &str,
) -> Vec<&'a Appointment> {
    appointments
        .iter()
        .filter(|a| a.provider_id == provider_id)
        .collect()
}

/// Appointments for the given service.
pub fn filter_by_service<'a>(
    appointments: &'a [Appointment],
    service_id: &str,
) -> Vec<&'a Appointment> {
    appointments
        .iter()
        .filter(|a| a.service_id == service_id)
        .collect()
}

/// Returns true if the appointment is still active and not yet elapsed.
pub fn is_upcoming(appointment: &Appointment, now: NaiveDateTime) -> bool {
    appointment.status.is_active() && appointment.date_time() >= now
}

/// Active appointments at or after `now`, soonest first.
pub fn upcoming(appointments: &[Appointment], now: NaiveDateTime) -> Vec<&Appointment> {
    let mut result: Vec<&Appointment> = appointments
        .iter()
        .filter(|a| is_upcoming(a, now))
        .collect();
    result.sort_by_key(|a| a.date_time());
    result
}

/// Everything that is not upcoming, most recent first.
pub fn past(appointments: &[Appointment], now: NaiveDateTime) -> Vec<&Appointment> {
    let mut result: Vec<&Appointment> = appointments
        .iter()
        .filter(|a| !is_upcoming(a, now))
        .collect();
    result.sort_by_key(|a| std::cmp::Reverse(a.date_time()));
    result
}

/// Number of appointments per status, in state machine order.
pub fn count_by_status(appointments: &[Appointment]) -> [(AppointmentStatus, usize); 4] {
    [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ]
    .map(|status| {
        let count = appointments.iter().filter(|a| a.status == status).count();
        (status, count)
    })
}
