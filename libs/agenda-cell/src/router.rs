// libs/agenda-cell/src/router.rs
use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers::{self, AgendaState};

/// Routes are relative; the api crate nests this under `/clinics`.
pub fn agenda_router(state: AgendaState) -> Router {
    Router::new()
        .route("/", post(handlers::bootstrap_clinic))
        .route("/{clinic_id}/agenda", get(handlers::agenda_window))
        .route(
            "/{clinic_id}/appointments",
            post(handlers::create_appointment).get(handlers::list_appointments),
        )
        .route(
            "/{clinic_id}/appointments/{appointment_id}",
            get(handlers::get_appointment)
                .put(handlers::update_appointment)
                .delete(handlers::delete_appointment),
        )
        .route(
            "/{clinic_id}/appointments/{appointment_id}/status",
            patch(handlers::update_appointment_status),
        )
        .route(
            "/{clinic_id}/appointments/{appointment_id}/occurrences/{occurrence_index}/cancel",
            post(handlers::cancel_occurrence),
        )
        .with_state(state)
}
