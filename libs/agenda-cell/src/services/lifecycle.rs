// libs/agenda-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use crate::models::{AgendaError, AppointmentStatus};

pub struct AppointmentLifecycle;

impl AppointmentLifecycle {
    /// Validate that a status transition is allowed.
    pub fn validate_transition(
        from: &AppointmentStatus,
        to: &AppointmentStatus,
    ) -> Result<(), AgendaError> {
        debug!("Validating status transition {} -> {}", from, to);

        if !Self::valid_transitions(from).contains(to) {
            warn!("Invalid status transition attempted: {} -> {}", from, to);
            return Err(AgendaError::InvalidStatusTransition {
                from: *from,
                to: *to,
            });
        }

        Ok(())
    }

    /// All valid next statuses for a given current status.
    pub fn valid_transitions(from: &AppointmentStatus) -> Vec<AppointmentStatus> {
        match from {
            AppointmentStatus::Pending => vec![
                AppointmentStatus::Confirmed,
                AppointmentStatus::Canceled,
            ],
            AppointmentStatus::Confirmed => vec![
                AppointmentStatus::Finished,
                AppointmentStatus::Canceled,
            ],
            // Terminal states
            AppointmentStatus::Finished => vec![],
            AppointmentStatus::Canceled => vec![],
        }
    }

    pub fn is_terminal(status: &AppointmentStatus) -> bool {
        Self::valid_transitions(status).is_empty()
    }
}
