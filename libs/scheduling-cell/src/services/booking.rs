// libs/scheduling-cell/src/services/booking.rs
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    Appointment, AppointmentStatus, BookAppointmentRequest, SchedulingError, SlotOutcome,
};
use crate::services::availability::AvailabilityService;
use crate::services::lifecycle::LifecycleService;
use crate::services::queue;
use crate::services::slots::{self, Clock};
use crate::store::{
    AppointmentFilter, AppointmentPatch, AppointmentStore, NewAppointment, ServiceCatalog,
};

/// Booking and lifecycle entry point. Handlers build one per request from the
/// shared state; collaborators arrive as Arcs.
pub struct SchedulingService {
    store: Arc<dyn AppointmentStore>,
    catalog: Arc<dyn ServiceCatalog>,
    clock: Arc<dyn Clock>,
    availability: AvailabilityService,
    lifecycle: LifecycleService,
}

impl SchedulingService {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        catalog: Arc<dyn ServiceCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let availability = AvailabilityService::new(Arc::clone(&store), Arc::clone(&clock));
        Self {
            store,
            catalog,
            clock,
            availability,
            lifecycle: LifecycleService::new(),
        }
    }

    pub fn availability(&self) -> &AvailabilityService {
        &self.availability
    }

    /// Book a slot. Availability is checked first for a precise rejection
    /// reason; the store's uniqueness constraint has the final word when two
    /// requests race for the same slot.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        info!(
            "Booking request for {} at {} {}",
            request.service, request.appointment_date, request.appointment_time
        );

        self.validate_booking(&request).await?;

        let outcome = self
            .availability
            .check_slot(request.appointment_date, request.appointment_time)
            .await?;
        if outcome != SlotOutcome::Free {
            warn!(
                "Slot {} {} rejected: {}",
                request.appointment_date, request.appointment_time, outcome
            );
            return Err(SchedulingError::SlotRejected(outcome));
        }

        let new = NewAppointment {
            customer_name: request.customer_name.trim().to_string(),
            customer_phone: request.customer_phone.trim().to_string(),
            customer_email: request.customer_email,
            service: request.service,
            appointment_date: request.appointment_date,
            appointment_time: request.appointment_time,
            status: AppointmentStatus::Confirmed,
            notes: request.notes,
        };

        // A losing race surfaces here as a constraint violation and maps to
        // the taken-by-existing rejection.
        let appointment = self.store.insert(new).await?;

        info!("Appointment {} booked", appointment.id);
        Ok(appointment)
    }

    pub async fn list_appointments(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let filter = match date {
            Some(d) => AppointmentFilter::for_date(d),
            None => AppointmentFilter::default(),
        };
        Ok(self.store.query(filter).await?)
    }

    pub async fn get_appointment(&self, id: Uuid) -> Result<Appointment, SchedulingError> {
        Ok(self.store.fetch(id).await?)
    }

    pub async fn delete_appointment(&self, id: Uuid) -> Result<(), SchedulingError> {
        self.store.delete(id).await?;
        info!("Appointment {} deleted", id);
        Ok(())
    }

    /// Drive the status machine. Queue entry and service start carry side
    /// effects beyond the status column; everything else is a plain write.
    pub async fn update_status(
        &self,
        id: Uuid,
        target: AppointmentStatus,
    ) -> Result<Appointment, SchedulingError> {
        let current = self.store.fetch(id).await?;

        // Repeating the current status is a no-op, not an error.
        if current.status == target {
            debug!("Appointment {} already {}", id, target);
            return Ok(current);
        }

        self.lifecycle.validate_transition(&current.status, &target)?;

        match target {
            AppointmentStatus::InQueue => self.enqueue(current).await,
            AppointmentStatus::InProgress => self.start_service(current).await,
            _ => {
                let patch = AppointmentPatch {
                    status: Some(target.clone()),
                    ..Default::default()
                };
                let updated = self.store.update(id, patch).await?;
                info!("Appointment {} moved to {}", id, target);
                Ok(updated)
            }
        }
    }

    /// Check a customer in: shorthand for updating status to in-queue.
    pub async fn add_to_queue(&self, id: Uuid) -> Result<Appointment, SchedulingError> {
        self.update_status(id, AppointmentStatus::InQueue).await
    }

    async fn enqueue(&self, appointment: Appointment) -> Result<Appointment, SchedulingError> {
        let todays = self
            .store
            .query(AppointmentFilter {
                date: Some(self.clock.today()),
                statuses: Some(vec![AppointmentStatus::InQueue]),
            })
            .await?;

        let position = queue::next_queue_position(&todays);

        let patch = AppointmentPatch {
            status: Some(AppointmentStatus::InQueue),
            queue_position: Some(Some(position)),
        };
        let updated = self.store.update(appointment.id, patch).await?;

        info!(
            "Appointment {} queued at position {}",
            appointment.id, position
        );
        Ok(updated)
    }

    /// One chair: starting a customer completes whoever was in progress and
    /// clears the started customer's queue position.
    async fn start_service(
        &self,
        appointment: Appointment,
    ) -> Result<Appointment, SchedulingError> {
        let in_progress = self
            .store
            .query(AppointmentFilter::with_statuses(vec![
                AppointmentStatus::InProgress,
            ]))
            .await?;

        for occupant in in_progress.iter().filter(|a| a.id != appointment.id) {
            let patch = AppointmentPatch {
                status: Some(AppointmentStatus::Completed),
                ..Default::default()
            };
            self.store.update(occupant.id, patch).await?;
            info!("Appointment {} auto-completed to free the chair", occupant.id);
        }

        let patch = AppointmentPatch {
            status: Some(AppointmentStatus::InProgress),
            queue_position: Some(None),
        };
        let updated = self.store.update(appointment.id, patch).await?;

        info!("Appointment {} now being served", appointment.id);
        Ok(updated)
    }

    async fn validate_booking(
        &self,
        request: &BookAppointmentRequest,
    ) -> Result<(), SchedulingError> {
        if request.customer_name.trim().is_empty() {
            return Err(SchedulingError::ValidationError(
                "Customer name is required".to_string(),
            ));
        }
        if request.customer_phone.trim().is_empty() {
            return Err(SchedulingError::ValidationError(
                "Customer phone is required".to_string(),
            ));
        }
        if !slots::is_slot_time(request.appointment_time) {
            return Err(SchedulingError::ValidationError(format!(
                "{} is not a bookable slot time",
                request.appointment_time
            )));
        }

        let known = self.catalog.has_service(&request.service).await?;
        if !known {
            return Err(SchedulingError::ValidationError(format!(
                "Unknown service: {}",
                request.service
            )));
        }

        Ok(())
    }
}
