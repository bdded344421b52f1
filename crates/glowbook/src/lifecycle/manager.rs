//! Appointment lifecycle manager.
//!
//! Owns the signed-in user's appointment list for one session. Mutations are
//! applied optimistically, confirmed against the backend, and rolled back to
//! the entry's pre-call value if the backend rejects them.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;
use tokio::sync::RwLock;
use uuid::Uuid;

use glowbook_core::appointment::{
    self as views, guard_transition, upsert_appointment, validate_create,
    validate_update, Appointment, AppointmentStatus, CreateAppointmentRequest, LifecycleError,
    Result, UpdateAppointmentRequest,
};
use glowbook_core::cache::APPOINTMENTS_KEY;
use glowbook_core::notify::{Diagnostics, NotificationScheduler, Reminder, Toast, Toaster};
use glowbook_core::storage::AppointmentBackend;

use crate::store::{KeyedStore, SetOptions};

/// Default lifetime of the cached appointment list.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Side-effect sinks the manager reports to.
#[derive(Clone)]
pub struct Collaborators {
    pub scheduler: Arc<dyn NotificationScheduler>,
    pub diagnostics: Arc<dyn Diagnostics>,
    pub toaster: Arc<dyn Toaster>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Load,
    Create,
    Update,
    Cancel,
    Confirm,
    Complete,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::Load => "load",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Cancel => "cancel",
            Operation::Confirm => "confirm",
            Operation::Complete => "complete",
        }
    }

    fn event(self) -> &'static str {
        match self {
            Operation::Load => "appointments_loaded",
            Operation::Create => "appointment_created",
            Operation::Update => "appointment_updated",
            Operation::Cancel => "appointment_cancelled",
            Operation::Confirm => "appointment_confirmed",
            Operation::Complete => "appointment_completed",
        }
    }

    fn success_message(self) -> &'static str {
        match self {
            Operation::Load => "Appointments loaded",
            Operation::Create => "Appointment booked",
            Operation::Update => "Appointment updated",
            Operation::Cancel => "Appointment cancelled",
            Operation::Confirm => "Appointment confirmed",
            Operation::Complete => "Appointment completed",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Operation::Load => "Could not load appointments",
            Operation::Create => "Could not book appointment",
            Operation::Update => "Could not update appointment",
            Operation::Cancel => "Could not cancel appointment",
            Operation::Confirm => "Could not confirm appointment",
            Operation::Complete => "Could not complete appointment",
        }
    }

    /// The status an explicit transition operation moves to.
    fn target_status(self) -> Option<AppointmentStatus> {
        match self {
            Operation::Cancel => Some(AppointmentStatus::Cancelled),
            Operation::Confirm => Some(AppointmentStatus::Confirmed),
            Operation::Complete => Some(AppointmentStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Default)]
struct State {
    appointments: Vec<Appointment>,
    last_error: Option<LifecycleError>,
}

/// An optimistic change awaiting the backend.
struct PendingUpdate {
    previous: Appointment,
    optimistic: Appointment,
}

/// Decrements the in-flight counter when an operation ends, however it ends.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Appointment list and lifecycle operations for one signed-in user.
pub struct AppointmentStore {
    user_id: Uuid,
    backend: Arc<dyn AppointmentBackend>,
    cache: KeyedStore,
    collaborators: Collaborators,
    cache_ttl: Duration,
    reminder_lead: chrono::Duration,
    state: RwLock<State>,
    generation: AtomicU64,
    in_flight: AtomicUsize,
}

impl AppointmentStore {
    /// Creates an empty store. Nothing is fetched until
    /// [`load_appointments`](Self::load_appointments) or
    /// [`ensure_loaded`](Self::ensure_loaded) is called.
    pub fn new(
        user_id: Uuid,
        backend: Arc<dyn AppointmentBackend>,
        cache: KeyedStore,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            user_id,
            backend,
            cache,
            collaborators,
            cache_ttl: DEFAULT_CACHE_TTL,
            reminder_lead: chrono::Duration::minutes(60),
            state: RwLock::new(State::default()),
            generation: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_reminder_lead(mut self, lead: chrono::Duration) -> Self {
        self.reminder_lead = lead;
        self
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Returns true while any operation is awaiting the backend.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Error of the most recent failed operation, cleared when the next
    /// operation starts.
    pub async fn last_error(&self) -> Option<LifecycleError> {
        self.state.read().await.last_error.clone()
    }

    /// Copy of the current list.
    pub async fn appointments(&self) -> Vec<Appointment> {
        self.state.read().await.appointments.clone()
    }

    /// Fetches the full list from the backend and replaces the local one.
    pub async fn load_appointments(&self) -> Result<Vec<Appointment>> {
        let (generation, _in_flight) = self.begin().await;
        let op = Operation::Load;

        let rows = match self.backend.list(self.user_id).await {
            Ok(rows) => rows,
            Err(err) => return Err(self.fail(op, err.into(), generation).await),
        };

        {
            let mut state = self.state.write().await;
            if self.is_stale(generation) {
                tracing::debug!(user_id = %self.user_id, "Ignoring list response after reset");
                return Ok(rows);
            }
            state.appointments = rows.clone();
            self.persist(&rows).await;
        }
        self.collaborators
            .diagnostics
            .log_event(op.event(), json!({ "count": rows.len() }));
        tracing::debug!(user_id = %self.user_id, count = rows.len(), "Loaded appointments");

        Ok(rows)
    }

    /// Hydrates the list from the cache when a fresh copy exists, otherwise
    /// loads it from the backend.
    pub async fn ensure_loaded(&self) -> Result<Vec<Appointment>> {
        let generation = self.current_generation();

        if let Some(rows) = self.cache.get::<Vec<Appointment>>(APPOINTMENTS_KEY).await {
            let mut state = self.state.write().await;
            if !self.is_stale(generation) {
                tracing::trace!(
                    user_id = %self.user_id,
                    count = rows.len(),
                    "Hydrated appointments from cache"
                );
                state.appointments = rows.clone();
                return Ok(rows);
            }
        }

        self.load_appointments().await
    }

    /// Books a new appointment. On success the server row is appended and a
    /// reminder is scheduled.
    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment> {
        let (generation, _in_flight) = self.begin().await;
        let op = Operation::Create;

        let draft = match validate_create(&request, self.user_id) {
            Ok(draft) => draft,
            Err(err) => return Err(self.fail(op, err.into(), generation).await),
        };

        let row = match self.backend.insert(&draft).await {
            Ok(row) => row,
            Err(err) => return Err(self.fail(op, err.into(), generation).await),
        };

        self.merge(&row, generation).await;
        self.schedule_reminder(&row).await;
        self.succeed(op, &row);

        Ok(row)
    }

    /// Applies a partial update. A status change must be a legal transition;
    /// setting the current status again is accepted.
    pub async fn update_appointment(
        &self,
        id: Uuid,
        update: UpdateAppointmentRequest,
    ) -> Result<Appointment> {
        self.mutate(id, update, Operation::Update).await
    }

    /// Cancels a scheduled or confirmed appointment.
    pub async fn cancel_appointment(&self, id: Uuid) -> Result<Appointment> {
        self.transition(id, Operation::Cancel).await
    }

    /// Confirms a scheduled appointment.
    pub async fn confirm_appointment(&self, id: Uuid) -> Result<Appointment> {
        self.transition(id, Operation::Confirm).await
    }

    /// Completes a confirmed appointment.
    pub async fn complete_appointment(&self, id: Uuid) -> Result<Appointment> {
        self.transition(id, Operation::Complete).await
    }

    pub async fn filter_by_status(&self, status: AppointmentStatus) -> Vec<Appointment> {
        let state = self.state.read().await;
        cloned(views::filter_by_status(&state.appointments, status))
    }

    pub async fn filter_by_date(&self, date: NaiveDate) -> Vec<Appointment> {
        let state = self.state.read().await;
        cloned(views::filter_by_date(&state.appointments, date))
    }

    pub async fn filter_by_provider(&self, provider_id: &str) -> Vec<Appointment> {
        let state = self.state.read().await;
        cloned(views::filter_by_provider(&state.appointments, provider_id))
    }

    pub async fn filter_by_service(&self, service_id: &str) -> Vec<Appointment> {
        let state = self.state.read().await;
        cloned(views::filter_by_service(&state.appointments, service_id))
    }

    /// Active appointments at or after `now`, soonest first.
    pub async fn upcoming(&self, now: NaiveDateTime) -> Vec<Appointment> {
        let state = self.state.read().await;
        cloned(views::upcoming(&state.appointments, now))
    }

    /// Everything else, most recent first.
    pub async fn past(&self, now: NaiveDateTime) -> Vec<Appointment> {
        let state = self.state.read().await;
        cloned(views::past(&state.appointments, now))
    }

    /// Drops all session state, e.g. on logout. Responses to calls issued
    /// before the reset are ignored.
    pub async fn reset(&self) {
        {
            let mut state = self.state.write().await;
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = State::default();
            self.cache.remove(APPOINTMENTS_KEY).await;
        }
        self.collaborators
            .diagnostics
            .log_event("appointments_reset", json!({}));
        tracing::debug!(user_id = %self.user_id, "Appointment store reset");
    }

    async fn transition(&self, id: Uuid, op: Operation) -> Result<Appointment> {
        let update = op
            .target_status()
            .map(UpdateAppointmentRequest::status)
            .unwrap_or_default();
        self.mutate(id, update, op).await
    }

    /// Validate, apply locally, confirm remotely, then merge or roll back.
    async fn mutate(
        &self,
        id: Uuid,
        update: UpdateAppointmentRequest,
        op: Operation,
    ) -> Result<Appointment> {
        let (generation, _in_flight) = self.begin().await;

        let pending = match self.apply_locally(id, &update, op).await {
            Ok(pending) => pending,
            Err(err) => return Err(self.fail(op, err, generation).await),
        };

        match self.backend.update(id, &update).await {
            Ok(row) => {
                self.merge(&row, generation).await;
                self.succeed(op, &row);
                Ok(row)
            }
            Err(err) => {
                self.rollback(pending, generation).await;
                Err(self.fail(op, err.into(), generation).await)
            }
        }
    }

    /// Checks preconditions and applies the optimistic update. Nothing
    /// changes if a check fails.
    async fn apply_locally(
        &self,
        id: Uuid,
        update: &UpdateAppointmentRequest,
        op: Operation,
    ) -> Result<PendingUpdate> {
        let mut state = self.state.write().await;

        let slot = state
            .appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(LifecycleError::NotFound(id))?;
        match op.target_status() {
            Some(next) => guard_transition(slot, next)?,
            None => validate_update(slot, update)?,
        }

        let previous = slot.clone();
        update.apply_to(slot);
        tracing::trace!(appointment_id = %id, operation = op.name(), "Applied optimistic update");

        Ok(PendingUpdate {
            previous,
            optimistic: slot.clone(),
        })
    }

    async fn merge(&self, row: &Appointment, generation: u64) {
        let mut state = self.state.write().await;
        if self.is_stale(generation) {
            tracing::debug!(appointment_id = %row.id, "Ignoring backend response after reset");
            return;
        }

        upsert_appointment(&mut state.appointments, row.clone());
        self.persist(&state.appointments).await;
    }

    /// Restores the entry a failed update touched, unless a later response
    /// has replaced the optimistic value meanwhile.
    async fn rollback(&self, pending: PendingUpdate, generation: u64) {
        let mut state = self.state.write().await;
        if self.is_stale(generation) {
            return;
        }

        let id = pending.previous.id;
        match state.appointments.iter_mut().find(|a| a.id == id) {
            Some(slot) if *slot == pending.optimistic => {
                *slot = pending.previous;
                tracing::debug!(appointment_id = %id, "Rolled back optimistic update");
            }
            _ => {
                tracing::debug!(appointment_id = %id, "Kept newer row over failed update");
            }
        }
    }

    async fn persist(&self, rows: &[Appointment]) {
        self.cache
            .set(APPOINTMENTS_KEY, rows, SetOptions::ttl(self.cache_ttl))
            .await;
    }

    async fn schedule_reminder(&self, row: &Appointment) {
        let Some(reminder) = Reminder::for_appointment(row, self.reminder_lead) else {
            tracing::warn!(appointment_id = %row.id, "Reminder time out of range, skipping");
            return;
        };
        if let Err(err) = self.collaborators.scheduler.schedule(&reminder).await {
            tracing::warn!(appointment_id = %row.id, error = %err, "Failed to schedule reminder");
        }
    }

    fn succeed(&self, op: Operation, row: &Appointment) {
        self.collaborators.diagnostics.log_event(
            op.event(),
            json!({
                "appointment_id": row.id,
                "service_id": row.service_id,
                "provider_id": row.provider_id,
                "status": row.status,
            }),
        );
        self.collaborators
            .toaster
            .show_toast(Toast::success(op.success_message()));
        tracing::info!(
            appointment_id = %row.id,
            status = %row.status,
            operation = op.name(),
            "Appointment operation succeeded"
        );
    }

    /// Reports a failure everywhere it must go and hands the error back.
    async fn fail(&self, op: Operation, err: LifecycleError, generation: u64) -> LifecycleError {
        tracing::warn!(
            operation = op.name(),
            kind = err.kind(),
            error = %err,
            "Appointment operation failed"
        );

        self.collaborators.diagnostics.record_error(&err);
        self.collaborators.diagnostics.log_event(
            "appointment_error",
            json!({ "operation": op.name(), "kind": err.kind() }),
        );
        self.collaborators
            .toaster
            .show_toast(Toast::error(op.failure_message()).with_description(err.to_string()));

        let mut state = self.state.write().await;
        if !self.is_stale(generation) {
            state.last_error = Some(err.clone());
        }
        err
    }

    async fn begin(&self) -> (u64, InFlight<'_>) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let guard = InFlight(&self.in_flight);
        self.state.write().await.last_error = None;
        (self.current_generation(), guard)
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.current_generation() != generation
    }
}

fn cloned(rows: Vec<&Appointment>) -> Vec<Appointment> {
    rows.into_iter().cloned().collect()
}
