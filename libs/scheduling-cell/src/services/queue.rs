// libs/scheduling-cell/src/services/queue.rs
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::models::{Appointment, AppointmentStatus, QueueEntry, QueueView, SchedulingError};
use crate::services::slots::Clock;
use crate::store::{AppointmentFilter, AppointmentStore, StoreChange};

/// Seconds between forced queue view refreshes. Change notifications arrive
/// faster; the interval covers writes this process never saw.
pub const QUEUE_REFRESH_SECONDS: u64 = 5;

// ==============================================================================
// QUEUE DERIVATION
// ==============================================================================

/// Next position for today's queue: one past the highest assigned so far.
/// Positions freed by served customers are never reused.
pub fn next_queue_position(todays: &[Appointment]) -> i32 {
    todays
        .iter()
        .filter(|a| a.status == AppointmentStatus::InQueue)
        .filter_map(|a| a.queue_position)
        .max()
        .unwrap_or(0)
        + 1
}

/// Project active appointments into the public waiting-room view.
///
/// `now_serving` is whoever is in progress. The waiting list holds confirmed
/// and queued customers ordered by queue position (unpositioned last), then
/// appointment time, then id so equal rows always land in the same order.
pub fn derive_queue_view(appointments: &[Appointment], generated_at: DateTime<Utc>) -> QueueView {
    let now_serving = appointments
        .iter()
        .find(|a| a.status == AppointmentStatus::InProgress)
        .map(QueueEntry::from);

    let mut waiting: Vec<&Appointment> = appointments
        .iter()
        .filter(|a| {
            matches!(
                a.status,
                AppointmentStatus::Confirmed | AppointmentStatus::InQueue
            )
        })
        .collect();

    waiting.sort_by_key(|a| {
        (
            a.queue_position.is_none(),
            a.queue_position.unwrap_or(0),
            a.appointment_time,
            a.id,
        )
    });

    QueueView {
        now_serving,
        waiting: waiting.into_iter().map(QueueEntry::from).collect(),
        generated_at,
    }
}

// ==============================================================================
// QUEUE VIEW SERVICE
// ==============================================================================

/// Maintains a cached queue view for the waiting-room display. Refreshes on
/// store change notifications and on a short interval as a safety net.
pub struct QueueViewService {
    store: Arc<dyn AppointmentStore>,
    clock: Arc<dyn Clock>,
    cached: RwLock<Option<QueueView>>,
    updates: broadcast::Sender<QueueView>,
    is_shutdown: RwLock<bool>,
}

impl QueueViewService {
    pub fn new(store: Arc<dyn AppointmentStore>, clock: Arc<dyn Clock>) -> Self {
        let (updates, _) = broadcast::channel(32);
        Self {
            store,
            clock,
            cached: RwLock::new(None),
            updates,
            is_shutdown: RwLock::new(false),
        }
    }

    /// Current view, from cache when warm.
    pub async fn current(&self) -> Result<QueueView, SchedulingError> {
        if let Some(view) = self.cached.read().await.clone() {
            return Ok(view);
        }
        self.refresh().await
    }

    /// Recompute from the store, cache, and publish to subscribers.
    pub async fn refresh(&self) -> Result<QueueView, SchedulingError> {
        let today = self.clock.today();
        let appointments = self
            .store
            .query(AppointmentFilter {
                date: Some(today),
                statuses: Some(vec![
                    AppointmentStatus::Confirmed,
                    AppointmentStatus::InQueue,
                    AppointmentStatus::InProgress,
                ]),
            })
            .await?;

        let view = derive_queue_view(&appointments, Utc::now());

        *self.cached.write().await = Some(view.clone());
        let _ = self.updates.send(view.clone());

        debug!(
            "Queue view refreshed: {} waiting, serving={}",
            view.waiting.len(),
            view.now_serving.is_some()
        );

        Ok(view)
    }

    /// Live feed of queue view updates.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueView> {
        self.updates.subscribe()
    }

    pub async fn shutdown(&self) {
        *self.is_shutdown.write().await = true;
        info!("Queue view refresher shutting down");
    }

    /// Refresh loop. Spawned once at startup and runs until shutdown.
    pub async fn run(&self) {
        let mut changes = self.store.subscribe_changes();
        let mut change_stream_open = true;
        let mut ticker = tokio::time::interval(Duration::from_secs(QUEUE_REFRESH_SECONDS));
        // A burst of missed ticks collapses into one refresh.
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!("Queue view refresher started");

        loop {
            if *self.is_shutdown.read().await {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.refresh().await {
                        warn!("Scheduled queue refresh failed: {}", e);
                    }
                }
                result = changes.recv(), if change_stream_open => {
                    match result {
                        Ok(StoreChange::Appointments) => {
                            if let Err(e) = self.refresh().await {
                                warn!("Change-driven queue refresh failed: {}", e);
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            debug!("Change stream lagged by {} events, refreshing", missed);
                            if let Err(e) = self.refresh().await {
                                warn!("Catch-up queue refresh failed: {}", e);
                            }
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            warn!("Store change stream closed; interval refresh only from here");
                            change_stream_open = false;
                        }
                    }
                }
            }
        }

        info!("Queue view refresher stopped");
    }
}
