// libs/scheduling-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub service: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub status: AppointmentStatus,
    pub queue_position: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// An active appointment occupies its slot; terminal ones do not.
    pub fn occupies_slot(&self, date: NaiveDate, time: NaiveTime) -> bool {
        self.status.is_active() && self.appointment_date == date && self.appointment_time == time
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    InQueue,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::InQueue => write!(f, "in-queue"),
            AppointmentStatus::InProgress => write!(f, "in-progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no-show"),
        }
    }
}

impl AppointmentStatus {
    /// Terminal statuses have no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::NoShow
        )
    }

    /// Active appointments occupy their slot and show up in the queue view.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// The statuses that count toward slot exclusivity.
    pub fn active_statuses() -> Vec<AppointmentStatus> {
        vec![
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            AppointmentStatus::InQueue,
            AppointmentStatus::InProgress,
        ]
    }

    /// Whether the status machine allows `self` → `target`. A same-status
    /// "transition" is always allowed so duplicate UI actions land as no-ops.
    /// `pending` is treated exactly like `confirmed` throughout.
    pub fn can_transition_to(&self, target: &AppointmentStatus) -> bool {
        use AppointmentStatus::*;

        if self == target {
            return true;
        }

        match (self, target) {
            (Pending, Confirmed) => true,
            (Pending | Confirmed, InQueue) => true,
            (Pending | Confirmed | InQueue, InProgress) => true,
            (InProgress, Completed) => true,
            (_, Cancelled) => !self.is_terminal(),
            (_, NoShow) => !self.is_terminal(),
            _ => false,
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub service: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

// ==============================================================================
// AVAILABILITY MODELS
// ==============================================================================

/// Outcome of checking a single (date, time) pair for booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum SlotOutcome {
    Free,
    TakenByExisting,
    PastDeadline,
    OutsideWindow,
}

impl SlotOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotOutcome::Free => "free",
            SlotOutcome::TakenByExisting => "taken-by-existing",
            SlotOutcome::PastDeadline => "past-deadline",
            SlotOutcome::OutsideWindow => "outside-window",
        }
    }
}

impl fmt::Display for SlotOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-slot classification for the booking form's day grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    Free,
    Taken,
    Past,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotInfo {
    pub time: NaiveTime,
    pub state: SlotState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub bookable: bool,
    /// Set when the whole day is rejected (`outside-window`), absent otherwise.
    pub reason: Option<SlotOutcome>,
    pub slots: Vec<SlotInfo>,
}

// ==============================================================================
// QUEUE VIEW MODELS
// ==============================================================================

/// Public queue projection. Deliberately excludes phone and email: this feeds
/// an unauthenticated waiting-room display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueEntry {
    pub customer_name: String,
    pub service: String,
    pub appointment_time: NaiveTime,
    pub queue_position: Option<i32>,
}

impl From<&Appointment> for QueueEntry {
    fn from(appointment: &Appointment) -> Self {
        Self {
            customer_name: appointment.customer_name.clone(),
            service: appointment.service.clone(),
            appointment_time: appointment.appointment_time,
            queue_position: appointment.queue_position,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueView {
    pub now_serving: Option<QueueEntry>,
    pub waiting: Vec<QueueEntry>,
    pub generated_at: DateTime<Utc>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Slot rejected: {0}")]
    SlotRejected(SlotOutcome),

    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&AppointmentStatus::InQueue).unwrap(),
            "\"in-queue\""
        );
        assert_eq!(
            serde_json::to_string(&AppointmentStatus::NoShow).unwrap(),
            "\"no-show\""
        );
        let parsed: AppointmentStatus = serde_json::from_str("\"in-progress\"").unwrap();
        assert_eq!(parsed, AppointmentStatus::InProgress);
    }

    #[test]
    fn same_status_transition_is_allowed() {
        use AppointmentStatus::*;
        for status in [Pending, Confirmed, InQueue, InProgress, Completed, Cancelled, NoShow] {
            assert!(status.can_transition_to(&status));
        }
    }

    #[test]
    fn pending_behaves_like_confirmed() {
        use AppointmentStatus::*;
        for target in [InQueue, InProgress, Cancelled, NoShow] {
            assert_eq!(
                Pending.can_transition_to(&target),
                Confirmed.can_transition_to(&target)
            );
        }
        // Plus the explicit confirmation edge.
        assert!(Pending.can_transition_to(&Confirmed));
        assert!(!Confirmed.can_transition_to(&Pending));
    }

    #[test]
    fn terminal_statuses_admit_nothing_new() {
        use AppointmentStatus::*;
        for terminal in [Completed, Cancelled, NoShow] {
            for target in [Pending, Confirmed, InQueue, InProgress, Completed, Cancelled, NoShow] {
                if target == terminal {
                    continue;
                }
                assert!(
                    !terminal.can_transition_to(&target),
                    "{} must not move to {}",
                    terminal,
                    target
                );
            }
        }
    }

    #[test]
    fn completion_requires_in_progress() {
        use AppointmentStatus::*;
        assert!(InProgress.can_transition_to(&Completed));
        assert!(!Confirmed.can_transition_to(&Completed));
        assert!(!InQueue.can_transition_to(&Completed));
    }

    #[test]
    fn active_statuses_match_is_active() {
        for status in AppointmentStatus::active_statuses() {
            assert!(status.is_active());
            assert!(!status.is_terminal());
        }
    }

    #[test]
    fn occupies_slot_ignores_terminal_rows() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let time = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        let mut appointment = Appointment {
            id: Uuid::new_v4(),
            customer_name: "Sam".to_string(),
            customer_phone: "+1-555-0000".to_string(),
            customer_email: None,
            service: "Classic Cut".to_string(),
            appointment_date: date,
            appointment_time: time,
            status: AppointmentStatus::Confirmed,
            queue_position: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(appointment.occupies_slot(date, time));
        appointment.status = AppointmentStatus::Cancelled;
        assert!(!appointment.occupies_slot(date, time));
    }
}
