// libs/agenda-cell/src/lib.rs
//
// The agenda cell: appointment model, recurrence expansion, calendar
// navigation, client-side filtering, and the scheduling service plus its
// HTTP surface.

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    AgendaError, AgendaFilterShape, Appointment, AppointmentStatus, ClinicTask,
    CreateAppointmentRequest, DateWindow, Occurrence, OccurrenceId, RecurrenceEnd,
    RecurrenceFrequency, RecurrenceRule, Specialty, TaskPriority, UpdateAppointmentRequest,
};
pub use services::agenda::AgendaService;
pub use services::bootstrap::{BootstrapOutcome, ClinicBootstrap};
pub use services::calendar::{CalendarState, ViewMode};
pub use services::filters::AgendaFilter;
pub use services::view::AgendaView;
