use uuid::Uuid;

use super::error::AppointmentError;
use super::requests::{CreateAppointmentRequest, UpdateAppointmentRequest};
use super::status::AppointmentStatus;
use super::types::{Appointment, NewAppointment};

/// Maximum length of appointment notes, in characters.
pub const MAX_NOTES_LEN: usize = 1000;

/// Validates a booking request and turns it into a draft for `user_id`.
///
/// Fields are checked in form order so the first missing one is reported.
pub fn validate_create(
    request: &CreateAppointmentRequest,
    user_id: Uuid,
) -> Result<NewAppointment, AppointmentError> {
    let service_id =
        non_blank(request.service_id.as_deref()).ok_or(AppointmentError::MissingServiceId)?;
    let provider_id =
        non_blank(request.provider_id.as_deref()).ok_or(AppointmentError::MissingProviderId)?;
    let date = request.date.ok_or(AppointmentError::MissingDate)?;
    let time = request.time.ok_or(AppointmentError::MissingTime)?;
    validate_notes(request.notes.as_deref())?;

    Ok(NewAppointment {
        user_id,
        service_id: service_id.to_string(),
        provider_id: provider_id.to_string(),
        date,
        time,
        status: AppointmentStatus::Scheduled,
        notes: request.notes.clone(),
    })
}

/// Validates an update against the appointment it targets.
///
/// A status change must be a legal transition. Setting the status an
/// appointment already has is accepted as a no-op.
pub fn validate_update(
    current: &Appointment,
    update: &UpdateAppointmentRequest,
) -> Result<(), AppointmentError> {
    if update.is_empty() {
        return Err(AppointmentError::EmptyUpdate);
    }
    if update.service_id.is_some() && non_blank(update.service_id.as_deref()).is_none() {
        return Err(AppointmentError::MissingServiceId);
    }
    if update.provider_id.is_some() && non_blank(update.provider_id.as_deref()).is_none() {
        return Err(AppointmentError::MissingProviderId);
    }
    validate_notes(update.notes.as_deref())?;

    match update.status {
        Some(next) if next != current.status => current.status.transition(next).map(|_| ()),
        _ => Ok(()),
    }
}

/// Checks that `current` may move to `next`, including the same-state case.
///
/// Used by the explicit cancel/confirm/complete operations, where asking
/// for the state an appointment is already in is a caller error.
pub fn guard_transition(
    current: &Appointment,
    next: AppointmentStatus,
) -> Result<(), AppointmentError> {
    current.status.transition(next).map(|_| ())
}

/// Finds an appointment by ID.
pub fn find_appointment(appointments: &[Appointment], id: Uuid) -> Option<&Appointment> {
    appointments.iter().find(|a| a.id == id)
}

/// Replaces the appointment with the same ID, or appends it if absent.
pub fn upsert_appointment(appointments: &mut Vec<Appointment>, row: Appointment) {
    match appointments.iter_mut().find(|a| a.id == row.id) {
        Some(slot) => *slot = row,
        None => appointments.push(row),
    }
}

/// Sorts appointments by date, then time, ascending.
pub fn sort_by_schedule(appointments: &mut [Appointment]) {
    appointments.sort_by_key(|a| a.date_time());
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn validate_notes(notes: Option<&str>) -> Result<(), AppointmentError> {
    match notes {
        Some(notes) if notes.chars().count() > MAX_NOTES_LEN => Err(AppointmentError::NotesTooLong),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn time(hour: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
    }

    fn scheduled() -> Appointment {
        Appointment::new(Uuid::new_v4(), "s1", "p1", date(1), time(10))
    }

    #[test]
    fn test_validate_create_success() {
        let user_id = Uuid::new_v4();
        let request = CreateAppointmentRequest::new("s1", "p1", date(1), time(10));

        let draft = validate_create(&request, user_id).unwrap();

        assert_eq!(draft.user_id, user_id);
        assert_eq!(draft.status, AppointmentStatus::Scheduled);
        assert_eq!(draft.service_id, "s1");
    }

    #[test]
    fn test_validate_create_reports_missing_fields() {
        let user_id = Uuid::new_v4();
        let full = CreateAppointmentRequest::new("s1", "p1", date(1), time(10));

        let mut request = full.clone();
        request.service_id = Some("   ".to_string());
        assert_eq!(
            validate_create(&request, user_id),
            Err(AppointmentError::MissingServiceId)
        );

        let mut request = full.clone();
        request.provider_id = None;
        assert_eq!(
            validate_create(&request, user_id),
            Err(AppointmentError::MissingProviderId)
        );

        let mut request = full.clone();
        request.date = None;
        assert_eq!(
            validate_create(&request, user_id),
            Err(AppointmentError::MissingDate)
        );

        let mut request = full;
        request.time = None;
        assert_eq!(
            validate_create(&request, user_id),
            Err(AppointmentError::MissingTime)
        );
    }

    #[test]
    fn test_validate_create_rejects_long_notes() {
        let request = CreateAppointmentRequest::new("s1", "p1", date(1), time(10))
            .with_notes("x".repeat(MAX_NOTES_LEN + 1));
        assert_eq!(
            validate_create(&request, Uuid::new_v4()),
            Err(AppointmentError::NotesTooLong)
        );
    }

    #[test]
    fn test_validate_update_rejects_empty() {
        assert_eq!(
            validate_update(&scheduled(), &UpdateAppointmentRequest::new()),
            Err(AppointmentError::EmptyUpdate)
        );
    }

    #[test]
    fn test_validate_update_checks_status_transition() {
        let current = scheduled();

        let skip = UpdateAppointmentRequest::status(AppointmentStatus::Completed);
        assert!(matches!(
            validate_update(&current, &skip),
            Err(AppointmentError::InvalidTransition { .. })
        ));

        let confirm = UpdateAppointmentRequest::status(AppointmentStatus::Confirmed);
        assert_eq!(validate_update(&current, &confirm), Ok(()));

        let same = UpdateAppointmentRequest::status(AppointmentStatus::Scheduled);
        assert_eq!(validate_update(&current, &same), Ok(()));
    }

    #[test]
    fn test_validate_update_rejects_blank_provider() {
        let update = UpdateAppointmentRequest::new().with_provider_id(" ");
        assert_eq!(
            validate_update(&scheduled(), &update),
            Err(AppointmentError::MissingProviderId)
        );
    }

    #[test]
    fn test_guard_transition_rejects_same_state() {
        let cancelled = scheduled().with_status(AppointmentStatus::Cancelled);
        assert!(guard_transition(&cancelled, AppointmentStatus::Cancelled).is_err());
        assert!(guard_transition(&scheduled(), AppointmentStatus::Cancelled).is_ok());
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let first = scheduled();
        let second = scheduled();
        let mut list = vec![first.clone(), second.clone()];

        let updated = first.clone().with_notes("updated");
        upsert_appointment(&mut list, updated.clone());

        assert_eq!(list.len(), 2);
        assert_eq!(list[0], updated);
        assert_eq!(list[1], second);

        let third = scheduled();
        upsert_appointment(&mut list, third.clone());
        assert_eq!(list.len(), 3);
        assert_eq!(find_appointment(&list, third.id), Some(&third));
    }

    #[test]
    fn test_sort_by_schedule() {
        let user = Uuid::new_v4();
        let mut list = vec![
            Appointment::new(user, "s", "p", date(3), time(9)),
            Appointment::new(user, "s", "p", date(1), time(15)),
            Appointment::new(user, "s", "p", date(1), time(9)),
        ];

        sort_by_schedule(&mut list);

        let keys: Vec<_> = list.iter().map(|a| (a.date, a.time)).collect();
        assert_eq!(
            keys,
            vec![(date(1), time(9)), (date(1), time(15)), (date(3), time(9))]
        );
    }
}
