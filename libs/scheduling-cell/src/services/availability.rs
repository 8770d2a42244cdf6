// libs/scheduling-cell/src/services/availability.rs
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use tracing::debug;

use crate::models::{DayAvailability, SchedulingError, SlotInfo, SlotOutcome, SlotState};
use crate::services::slots::{self, Clock};
use crate::store::{AppointmentFilter, AppointmentStore};

/// Classifies slots for booking. Checks are ordered: outside-window beats
/// past-deadline beats taken-by-existing.
pub struct AvailabilityService {
    store: Arc<dyn AppointmentStore>,
    clock: Arc<dyn Clock>,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn AppointmentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Outcome for one (date, time) pair.
    pub async fn check_slot(
        &self,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<SlotOutcome, SchedulingError> {
        let now = self.clock.now();

        if !slots::in_booking_window(date, now.date()) {
            return Ok(SlotOutcome::OutsideWindow);
        }
        if slots::is_past_slot(date, time, now) {
            return Ok(SlotOutcome::PastDeadline);
        }

        let active = self.store.query(AppointmentFilter::active_on(date)).await?;

        if active.iter().any(|a| a.appointment_time == time) {
            return Ok(SlotOutcome::TakenByExisting);
        }

        Ok(SlotOutcome::Free)
    }

    /// The full day grid for the booking form. Days outside the window come
    /// back unbookable with no slots.
    pub async fn day_availability(
        &self,
        date: NaiveDate,
    ) -> Result<DayAvailability, SchedulingError> {
        let now = self.clock.now();

        if !slots::in_booking_window(date, now.date()) {
            debug!("Availability requested outside booking window: {}", date);
            return Ok(DayAvailability {
                date,
                bookable: false,
                reason: Some(SlotOutcome::OutsideWindow),
                slots: Vec::new(),
            });
        }

        let active = self.store.query(AppointmentFilter::active_on(date)).await?;

        let slots = slots::slot_times()
            .into_iter()
            .map(|time| {
                let state = if slots::is_past_slot(date, time, now) {
                    SlotState::Past
                } else if active.iter().any(|a| a.appointment_time == time) {
                    SlotState::Taken
                } else {
                    SlotState::Free
                };
                SlotInfo { time, state }
            })
            .collect();

        Ok(DayAvailability {
            date,
            bookable: true,
            reason: None,
            slots,
        })
    }
}
