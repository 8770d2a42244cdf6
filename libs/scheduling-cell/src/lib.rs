// libs/scheduling-cell/src/lib.rs
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod state;
pub mod store;

pub use models::*;
pub use router::scheduling_routes;
pub use services::{
    AvailabilityService, Clock, FixedClock, LifecycleService, QueueViewService, SchedulingService,
    SystemClock,
};
pub use state::SchedulingState;
pub use store::{
    AppointmentFilter, AppointmentPatch, AppointmentStore, MemoryAppointmentStore, NewAppointment,
    ServiceCatalog, StaticCatalog, StoreChange, StoreError, SupabaseAppointmentStore,
};
