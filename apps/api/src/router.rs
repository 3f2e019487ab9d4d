use axum::{
    Router,
    routing::get,
};

use agenda_cell::handlers::AgendaState;
use agenda_cell::router::agenda_router;

pub fn create_router(state: AgendaState) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinica agenda API is running!" }))
        .nest("/clinics", agenda_router(state))
}
