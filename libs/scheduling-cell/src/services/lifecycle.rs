// libs/scheduling-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use crate::models::{AppointmentStatus, SchedulingError};

/// Guards the status machine. The transition table itself lives on
/// `AppointmentStatus`; this wraps it in logging and a typed error.
pub struct LifecycleService;

impl LifecycleService {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_transition(
        &self,
        current: &AppointmentStatus,
        target: &AppointmentStatus,
    ) -> Result<(), SchedulingError> {
        debug!("Validating status transition {} -> {}", current, target);

        if !current.can_transition_to(target) {
            warn!("Invalid status transition attempted: {} -> {}", current, target);
            return Err(SchedulingError::InvalidTransition {
                from: current.clone(),
                to: target.clone(),
            });
        }

        Ok(())
    }

    /// Every status reachable from `current` in one step, the same-status
    /// no-op excluded.
    pub fn valid_transitions(&self, current: &AppointmentStatus) -> Vec<AppointmentStatus> {
        use AppointmentStatus::*;

        [Pending, Confirmed, InQueue, InProgress, Completed, Cancelled, NoShow]
            .into_iter()
            .filter(|target| target != current && current.can_transition_to(target))
            .collect()
    }
}

impl Default for LifecycleService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_reachable_statuses_from_confirmed() {
        let lifecycle = LifecycleService::new();
        let targets = lifecycle.valid_transitions(&AppointmentStatus::Confirmed);

        assert_eq!(
            targets,
            vec![
                AppointmentStatus::InQueue,
                AppointmentStatus::InProgress,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
            ]
        );
    }

    #[test]
    fn test_completed_reaches_nothing() {
        let lifecycle = LifecycleService::new();
        assert!(lifecycle
            .valid_transitions(&AppointmentStatus::Completed)
            .is_empty());
    }

    #[test]
    fn test_validate_rejects_reopening_completed() {
        let lifecycle = LifecycleService::new();
        let result = lifecycle.validate_transition(
            &AppointmentStatus::Completed,
            &AppointmentStatus::InProgress,
        );

        assert_matches!(
            result,
            Err(SchedulingError::InvalidTransition {
                from: AppointmentStatus::Completed,
                to: AppointmentStatus::InProgress,
            })
        );
    }

    #[test]
    fn test_validate_accepts_queue_to_chair() {
        let lifecycle = LifecycleService::new();
        assert!(lifecycle
            .validate_transition(&AppointmentStatus::InQueue, &AppointmentStatus::InProgress)
            .is_ok());
    }
}
