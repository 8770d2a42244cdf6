// libs/scheduling-cell/src/services/mod.rs
pub mod availability;
pub mod booking;
pub mod lifecycle;
pub mod queue;
pub mod slots;

pub use availability::AvailabilityService;
pub use booking::SchedulingService;
pub use lifecycle::LifecycleService;
pub use queue::{derive_queue_view, next_queue_position, QueueViewService};
pub use slots::{Clock, FixedClock, SystemClock};
