// libs/agenda-cell/src/services/view.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use live_query_cell::{LiveQuery, QuerySnapshot};
use shared_models::ClinicId;
use shared_store::DocumentStore;
use tenant_cell::Scoped;

use crate::models::{AgendaFilterShape, Appointment, Occurrence};
use crate::services::calendar::{CalendarState, ViewMode};
use crate::services::filters::{self, AgendaFilter};
use crate::services::recurrence;

/// One mounted agenda screen: calendar navigation state, the live
/// appointment subscription it drives, and the client-side filters
/// layered on top. Day mode subscribes by date; week and month modes
/// subscribe unfiltered and narrow via expansion + filtering.
pub struct AgendaView {
    clinic: Scoped<ClinicId>,
    calendar: CalendarState,
    filter: AgendaFilter,
    query: LiveQuery<Appointment, AgendaFilterShape>,
    active_shape: Option<AgendaFilterShape>,
}

impl AgendaView {
    pub async fn open(
        store: Arc<dyn DocumentStore<Appointment, AgendaFilterShape>>,
        clinic: Scoped<ClinicId>,
        anchor: NaiveDate,
        mode: ViewMode,
    ) -> Self {
        let mut view = Self {
            clinic,
            calendar: CalendarState::new(anchor, mode),
            filter: AgendaFilter::default(),
            query: LiveQuery::new(store),
            active_shape: None,
        };
        view.resubscribe().await;
        view
    }

    pub fn calendar(&self) -> &CalendarState {
        &self.calendar
    }

    pub fn snapshot(&self) -> QuerySnapshot<Appointment> {
        self.query.snapshot()
    }

    pub async fn go_previous(&mut self) {
        self.calendar.go_previous();
        self.sync_subscription().await;
    }

    pub async fn go_next(&mut self) {
        self.calendar.go_next();
        self.sync_subscription().await;
    }

    pub async fn go_to_today(&mut self, today: NaiveDate) {
        self.calendar.go_to_today_on(today);
        self.sync_subscription().await;
    }

    pub async fn switch_view(&mut self, mode: ViewMode) {
        self.calendar.switch_view(mode);
        self.sync_subscription().await;
    }

    pub async fn select_day(&mut self, day: NaiveDate) {
        self.calendar.select_day(day);
        self.sync_subscription().await;
    }

    /// Status/specialty narrowing is purely client-side; changing it
    /// never resubscribes.
    pub fn set_filter(&mut self, filter: AgendaFilter) {
        self.filter = filter;
    }

    /// Explicit recovery after a subscription error.
    pub async fn refresh(&self) {
        self.query.refresh().await;
    }

    /// Everything the current view renders: recurrences expanded over
    /// the visible window, client filters applied, sorted by date.
    pub fn visible(&self) -> Vec<Occurrence> {
        let snapshot = self.query.snapshot();
        let expanded = recurrence::expand(&snapshot.items, self.calendar.window());
        self.filter.apply_occurrences(&expanded)
    }

    /// Appointments of one calendar day, with the reference day supplied
    /// by the caller.
    pub fn appointments_on(&self, day: NaiveDate) -> Vec<Appointment> {
        filters::appointments_on(&self.query.snapshot().items, day)
    }

    pub async fn close(&self) {
        self.query.detach();
    }

    async fn sync_subscription(&mut self) {
        let shape = self.calendar.filter_shape();
        if self.active_shape == Some(shape) {
            return;
        }
        self.resubscribe().await;
    }

    async fn resubscribe(&mut self) {
        let shape = self.calendar.filter_shape();
        debug!("Agenda view subscribing with shape {:?}", shape);
        let filter = match shape {
            AgendaFilterShape::All => None,
            narrowed => Some(narrowed),
        };
        self.query.set_scope(self.clinic, filter).await;
        self.active_shape = Some(shape);
    }
}
