// libs/scheduling-cell/src/store/mod.rs
pub mod memory;
pub mod supabase;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::{Appointment, AppointmentStatus, SchedulingError, SlotOutcome};

pub use memory::MemoryAppointmentStore;
pub use supabase::SupabaseAppointmentStore;

// ==============================================================================
// STORE CONTRACT
// ==============================================================================

/// Row as inserted; the store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub service: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

/// Filter for `query`. Results come back ordered by appointment time
/// ascending.
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub date: Option<NaiveDate>,
    pub statuses: Option<Vec<AppointmentStatus>>,
}

impl AppointmentFilter {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            statuses: None,
        }
    }

    /// Slot-occupying appointments on a date.
    pub fn active_on(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            statuses: Some(AppointmentStatus::active_statuses()),
        }
    }

    pub fn with_statuses(statuses: Vec<AppointmentStatus>) -> Self {
        Self {
            date: None,
            statuses: Some(statuses),
        }
    }
}

/// Partial update. `queue_position` distinguishes "leave alone" (None) from
/// "clear the column" (Some(None)).
#[derive(Debug, Clone, Default)]
pub struct AppointmentPatch {
    pub status: Option<AppointmentStatus>,
    pub queue_position: Option<Option<i32>>,
}

/// Store-level change notification, fanned out to the queue view refresher.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreChange {
    Appointments,
}

#[derive(Error, Debug)]
pub enum StoreError {
    /// The slot uniqueness constraint fired on insert.
    #[error("Active appointment already occupies this slot")]
    ConstraintViolation,

    #[error("Record not found")]
    NotFound,

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for SchedulingError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ConstraintViolation => {
                SchedulingError::SlotRejected(SlotOutcome::TakenByExisting)
            }
            StoreError::NotFound => SchedulingError::NotFound,
            StoreError::Unavailable(msg) => SchedulingError::StoreUnavailable(msg),
        }
    }
}

/// Persistence port for appointments. The Supabase implementation backs
/// production; the in-memory one backs tests and offline demos.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn insert(&self, new: NewAppointment) -> Result<Appointment, StoreError>;

    async fn query(&self, filter: AppointmentFilter) -> Result<Vec<Appointment>, StoreError>;

    async fn fetch(&self, id: Uuid) -> Result<Appointment, StoreError>;

    async fn update(&self, id: Uuid, patch: AppointmentPatch) -> Result<Appointment, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Change stream for cache invalidation. Lagging receivers may miss
    /// messages; the queue view falls back to interval polling anyway.
    fn subscribe_changes(&self) -> broadcast::Receiver<StoreChange>;
}

// ==============================================================================
// SERVICE CATALOG PORT
// ==============================================================================

/// Booking-time check that the requested service is on the menu.
#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    async fn has_service(&self, name: &str) -> Result<bool, StoreError>;
}

#[async_trait]
impl ServiceCatalog for catalog_cell::services::catalog::CatalogService {
    async fn has_service(&self, name: &str) -> Result<bool, StoreError> {
        self.service_exists(name)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

/// Fixed service list for tests.
pub struct StaticCatalog {
    names: Vec<String>,
}

impl StaticCatalog {
    pub fn new(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

#[async_trait]
impl ServiceCatalog for StaticCatalog {
    async fn has_service(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.names.iter().any(|n| n == name))
    }
}
