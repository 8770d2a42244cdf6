// libs/scheduling-cell/src/store/memory.rs
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::Appointment;
use crate::store::{
    AppointmentFilter, AppointmentPatch, AppointmentStore, NewAppointment, StoreChange, StoreError,
};

/// In-memory store with the same slot uniqueness guarantee the database
/// enforces in production. One mutex over the whole map keeps check-and-insert
/// atomic, which is what concurrent booking tests lean on.
pub struct MemoryAppointmentStore {
    rows: Mutex<HashMap<Uuid, Appointment>>,
    changes: broadcast::Sender<StoreChange>,
}

impl MemoryAppointmentStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            rows: Mutex::new(HashMap::new()),
            changes,
        }
    }

    fn notify(&self) {
        let _ = self.changes.send(StoreChange::Appointments);
    }

    fn lock_rows(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Appointment>>, StoreError> {
        self.rows
            .lock()
            .map_err(|_| StoreError::Unavailable("Store mutex poisoned".to_string()))
    }
}

impl Default for MemoryAppointmentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AppointmentStore for MemoryAppointmentStore {
    async fn insert(&self, new: NewAppointment) -> Result<Appointment, StoreError> {
        let appointment = {
            let mut rows = self.lock_rows()?;

            // Same rule as the partial unique index: at most one active
            // appointment per (date, time).
            let taken = rows
                .values()
                .any(|existing| existing.occupies_slot(new.appointment_date, new.appointment_time));
            if taken {
                return Err(StoreError::ConstraintViolation);
            }

            let now = Utc::now();
            let appointment = Appointment {
                id: Uuid::new_v4(),
                customer_name: new.customer_name,
                customer_phone: new.customer_phone,
                customer_email: new.customer_email,
                service: new.service,
                appointment_date: new.appointment_date,
                appointment_time: new.appointment_time,
                status: new.status,
                queue_position: None,
                notes: new.notes,
                created_at: now,
                updated_at: now,
            };
            rows.insert(appointment.id, appointment.clone());
            appointment
        };

        self.notify();
        Ok(appointment)
    }

    async fn query(&self, filter: AppointmentFilter) -> Result<Vec<Appointment>, StoreError> {
        let mut matching: Vec<Appointment> = {
            let rows = self.lock_rows()?;
            rows.values()
                .filter(|a| filter.date.map_or(true, |d| a.appointment_date == d))
                .filter(|a| {
                    filter
                        .statuses
                        .as_ref()
                        .map_or(true, |statuses| statuses.contains(&a.status))
                })
                .cloned()
                .collect()
        };

        matching.sort_by_key(|a| (a.appointment_date, a.appointment_time, a.id));
        Ok(matching)
    }

    async fn fetch(&self, id: Uuid) -> Result<Appointment, StoreError> {
        let rows = self.lock_rows()?;
        rows.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn update(&self, id: Uuid, patch: AppointmentPatch) -> Result<Appointment, StoreError> {
        let appointment = {
            let mut rows = self.lock_rows()?;
            let appointment = rows.get_mut(&id).ok_or(StoreError::NotFound)?;

            if let Some(status) = patch.status {
                appointment.status = status;
            }
            if let Some(queue_position) = patch.queue_position {
                appointment.queue_position = queue_position;
            }
            appointment.updated_at = Utc::now();
            appointment.clone()
        };

        self.notify();
        Ok(appointment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        {
            let mut rows = self.lock_rows()?;
            rows.remove(&id).ok_or(StoreError::NotFound)?;
        }
        self.notify();
        Ok(())
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
