//! Fakes shared by the unit tests in this crate.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use uuid::Uuid;

use glowbook_core::appointment::{Appointment, NewAppointment, UpdateAppointmentRequest};
use glowbook_core::cache::{CacheError, StorageMedium};
use glowbook_core::catalog::{Professional, Service};
use glowbook_core::notify::{
    Diagnostics, NotificationError, NotificationScheduler, Reminder, Toast, Toaster,
};
use glowbook_core::storage::{AppointmentBackend, BackendError, CatalogBackend};

use crate::backend::InMemoryBackend;

/// Diagnostics sink that remembers everything it was given.
#[derive(Default)]
pub struct RecordingDiagnostics {
    events: Mutex<Vec<(String, serde_json::Value)>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingDiagnostics {
    pub fn events(&self) -> Vec<(String, serde_json::Value)> {
        self.events.lock().unwrap().clone()
    }

    pub fn event_names(&self) -> Vec<String> {
        self.events().into_iter().map(|(name, _)| name).collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn log_event(&self, name: &str, params: serde_json::Value) {
        self.events.lock().unwrap().push((name.to_string(), params));
    }

    fn record_error(&self, error: &(dyn std::error::Error + 'static)) {
        self.errors.lock().unwrap().push(error.to_string());
    }
}

#[derive(Default)]
pub struct RecordingToaster {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingToaster {
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }
}

impl Toaster for RecordingToaster {
    fn show_toast(&self, toast: Toast) {
        self.toasts.lock().unwrap().push(toast);
    }
}

#[derive(Default)]
pub struct RecordingScheduler {
    reminders: Mutex<Vec<Reminder>>,
    fail: AtomicBool,
}

impl RecordingScheduler {
    pub fn failing() -> Self {
        Self {
            fail: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub fn reminders(&self) -> Vec<Reminder> {
        self.reminders.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationScheduler for RecordingScheduler {
    async fn schedule(&self, reminder: &Reminder) -> Result<(), NotificationError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotificationError::PermissionDenied);
        }
        self.reminders.lock().unwrap().push(reminder.clone());
        Ok(())
    }
}

/// Medium whose every operation fails.
pub struct FailingMedium;

#[async_trait]
impl StorageMedium for FailingMedium {
    async fn get(&self, _key: &str) -> glowbook_core::cache::Result<Option<String>> {
        Err(CacheError::Unavailable("medium offline".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str) -> glowbook_core::cache::Result<()> {
        Err(CacheError::QuotaExceeded)
    }

    async fn remove(&self, _key: &str) -> glowbook_core::cache::Result<()> {
        Err(CacheError::Unavailable("medium offline".to_string()))
    }

    async fn keys(&self) -> glowbook_core::cache::Result<Vec<String>> {
        Err(CacheError::Unavailable("medium offline".to_string()))
    }
}

/// Pauses a backend call until the test releases it.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

impl Gate {
    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

/// In-memory backend that can be switched to fail or to pause each call.
#[derive(Default)]
pub struct FlakyBackend {
    pub inner: InMemoryBackend,
    fail: AtomicBool,
    calls: AtomicUsize,
    gate: Option<Arc<Gate>>,
    queued: Mutex<VecDeque<Arc<Gate>>>,
}

impl FlakyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call waits on `gate` before answering.
    pub fn gated(gate: Arc<Gate>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    /// The next call without a queued gate ahead of it waits on `gate`.
    pub fn push_gate(&self, gate: Arc<Gate>) {
        self.queued.lock().unwrap().push_back(gate);
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of calls that reached the backend.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let queued = self.queued.lock().unwrap().pop_front();
        if let Some(gate) = queued.as_ref().or(self.gate.as_ref()) {
            gate.pass().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(BackendError::Network("connection reset".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AppointmentBackend for FlakyBackend {
    async fn list(&self, user_id: Uuid) -> Result<Vec<Appointment>, BackendError> {
        self.enter().await?;
        self.inner.list(user_id).await
    }

    async fn insert(&self, appointment: &NewAppointment) -> Result<Appointment, BackendError> {
        self.enter().await?;
        self.inner.insert(appointment).await
    }

    async fn update(
        &self,
        id: Uuid,
        update: &UpdateAppointmentRequest,
    ) -> Result<Appointment, BackendError> {
        self.enter().await?;
        self.inner.update(id, update).await
    }
}

#[async_trait]
impl CatalogBackend for FlakyBackend {
    async fn list_services(&self) -> Result<Vec<Service>, BackendError> {
        self.enter().await?;
        self.inner.list_services().await
    }

    async fn list_professionals(&self) -> Result<Vec<Professional>, BackendError> {
        self.enter().await?;
        self.inner.list_professionals().await
    }
}
