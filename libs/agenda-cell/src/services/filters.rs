// libs/agenda-cell/src/services/filters.rs
//
// Client-side projections over an already-subscribed collection. No
// store round-trips here; everything derives from the data in hand.

use chrono::NaiveDate;
use std::cmp::Ordering;

use crate::models::{Appointment, AppointmentStatus, ClinicTask, Occurrence, Specialty, TaskPriority};

/// Status/specialty narrowing. Within one dimension selections are OR'd;
/// the two dimensions are AND'd; an empty selection leaves that
/// dimension unrestricted.
#[derive(Debug, Clone, Default)]
pub struct AgendaFilter {
    pub statuses: Vec<AppointmentStatus>,
    pub specialties: Vec<Specialty>,
}

impl AgendaFilter {
    pub fn is_unrestricted(&self) -> bool {
        self.statuses.is_empty() && self.specialties.is_empty()
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        let status_ok =
            self.statuses.is_empty() || self.statuses.contains(&appointment.status);
        let specialty_ok =
            self.specialties.is_empty() || self.specialties.contains(&appointment.specialty);
        status_ok && specialty_ok
    }

    pub fn apply(&self, appointments: &[Appointment]) -> Vec<Appointment> {
        appointments
            .iter()
            .filter(|a| self.matches(a))
            .cloned()
            .collect()
    }

    pub fn apply_occurrences(&self, occurrences: &[Occurrence]) -> Vec<Occurrence> {
        occurrences
            .iter()
            .filter(|o| self.matches(&o.appointment))
            .cloned()
            .collect()
    }
}

/// Appointments whose calendar day equals `day`. The caller supplies the
/// reference day, so long-lived sessions recompute correctly across a
/// day boundary instead of memoizing a stale "today".
pub fn appointments_on(appointments: &[Appointment], day: NaiveDate) -> Vec<Appointment> {
    let mut result: Vec<Appointment> = appointments
        .iter()
        .filter(|a| a.calendar_day() == day)
        .cloned()
        .collect();
    result.sort_by_key(|a| a.date);
    result
}

/// Anything orderable by urgency: priority first, due date second.
pub trait Prioritized {
    fn priority(&self) -> TaskPriority;
    fn due_date(&self) -> Option<NaiveDate>;
}

impl Prioritized for ClinicTask {
    fn priority(&self) -> TaskPriority {
        self.priority
    }

    fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }
}

/// High before medium before low; inside one priority, earlier due dates
/// first and items without a due date last.
pub fn sort_by_priority<T: Prioritized>(items: &mut [T]) {
    items.sort_by(|a, b| {
        a.priority()
            .rank()
            .cmp(&b.priority().rank())
            .then_with(|| match (a.due_date(), b.due_date()) {
                (Some(a_due), Some(b_due)) => a_due.cmp(&b_due),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    });
}
