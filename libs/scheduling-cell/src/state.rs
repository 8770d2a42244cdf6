// libs/scheduling-cell/src/state.rs
use std::sync::Arc;

use catalog_cell::services::catalog::CatalogService;
use identity_cell::services::roles::RoleService;
use shared_config::AppConfig;

use crate::services::booking::SchedulingService;
use crate::services::queue::QueueViewService;
use crate::services::slots::{Clock, SystemClock};
use crate::store::{AppointmentStore, ServiceCatalog, SupabaseAppointmentStore};

/// Shared state for the scheduling routes. Built once at startup; the store,
/// catalog and clock are trait objects so tests swap in offline versions.
#[derive(Clone)]
pub struct SchedulingState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn AppointmentStore>,
    pub catalog: Arc<dyn ServiceCatalog>,
    pub roles: Arc<RoleService>,
    pub clock: Arc<dyn Clock>,
    pub queue_view: Arc<QueueViewService>,
}

impl SchedulingState {
    /// Production wiring: Supabase store, live catalog, system clock.
    pub fn new(config: Arc<AppConfig>) -> Self {
        let store: Arc<dyn AppointmentStore> = Arc::new(SupabaseAppointmentStore::new(&config));
        let catalog: Arc<dyn ServiceCatalog> = Arc::new(CatalogService::new(&config));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self::with_parts(config, store, catalog, clock)
    }

    /// Explicit wiring for tests and alternative deployments.
    pub fn with_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn AppointmentStore>,
        catalog: Arc<dyn ServiceCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let roles = Arc::new(RoleService::new(&config));
        let queue_view = Arc::new(QueueViewService::new(Arc::clone(&store), Arc::clone(&clock)));
        Self {
            config,
            store,
            catalog,
            roles,
            clock,
            queue_view,
        }
    }

    /// Per-request service assembly.
    pub fn scheduling_service(&self) -> SchedulingService {
        SchedulingService::new(
            Arc::clone(&self.store),
            Arc::clone(&self.catalog),
            Arc::clone(&self.clock),
        )
    }
}
