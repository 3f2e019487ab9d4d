// libs/agenda-cell/src/services/calendar.rs
//
// Calendar navigation state machine: `{ anchor, mode }` and nothing
// else. Transitions are deterministic; only `select_day` changes both
// fields, and it changes them together.

use chrono::{Datelike, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AgendaFilterShape, DateWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Day,
    Week,
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarState {
    anchor: NaiveDate,
    mode: ViewMode,
}

const MONTHS_PT: [&str; 12] = [
    "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto", "setembro",
    "outubro", "novembro", "dezembro",
];

impl CalendarState {
    pub fn new(anchor: NaiveDate, mode: ViewMode) -> Self {
        Self { anchor, mode }
    }

    pub fn today(mode: ViewMode) -> Self {
        Self::new(Utc::now().date_naive(), mode)
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Step back one day/week/month depending on the mode. The mode is
    /// never altered by stepping.
    pub fn go_previous(&mut self) {
        self.anchor = match self.mode {
            ViewMode::Day => self.anchor - Duration::days(1),
            ViewMode::Week => self.anchor - Duration::weeks(1),
            ViewMode::Month => self
                .anchor
                .checked_sub_months(Months::new(1))
                .unwrap_or(self.anchor),
        };
    }

    pub fn go_next(&mut self) {
        self.anchor = match self.mode {
            ViewMode::Day => self.anchor + Duration::days(1),
            ViewMode::Week => self.anchor + Duration::weeks(1),
            ViewMode::Month => self
                .anchor
                .checked_add_months(Months::new(1))
                .unwrap_or(self.anchor),
        };
    }

    pub fn go_to_today(&mut self) {
        self.go_to_today_on(Utc::now().date_naive());
    }

    /// Same transition with the reference day supplied by the caller.
    pub fn go_to_today_on(&mut self, today: NaiveDate) {
        self.anchor = today;
    }

    /// Switching modes must not lose the user's place.
    pub fn switch_view(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    /// The one transition that changes both fields, together: jump from a
    /// week/month cell into that day's agenda.
    pub fn select_day(&mut self, day: NaiveDate) {
        self.anchor = day;
        self.mode = ViewMode::Day;
    }

    /// Half-open day window the current view must render. Weeks start on
    /// Monday; the month window runs first-of-month to first-of-next.
    pub fn window(&self) -> DateWindow {
        match self.mode {
            ViewMode::Day => DateWindow::new(self.anchor, self.anchor + Duration::days(1)),
            ViewMode::Week => {
                let monday = self.anchor
                    - Duration::days(self.anchor.weekday().num_days_from_monday() as i64);
                DateWindow::new(monday, monday + Duration::days(7))
            }
            ViewMode::Month => {
                let first = self.anchor.with_day(1).unwrap_or(self.anchor);
                let next = first
                    .checked_add_months(Months::new(1))
                    .unwrap_or(first + Duration::days(31));
                DateWindow::new(first, next)
            }
        }
    }

    /// Display label for the navigation header, in the tenant language.
    pub fn label(&self) -> String {
        match self.mode {
            ViewMode::Day => self.anchor.format("%d/%m/%Y").to_string(),
            ViewMode::Week => {
                let window = self.window();
                let last = window.end - Duration::days(1);
                format!(
                    "{} a {}",
                    window.start.format("%d/%m"),
                    last.format("%d/%m/%Y")
                )
            }
            ViewMode::Month => {
                let month = MONTHS_PT[self.anchor.month0() as usize];
                format!("{} de {}", month, self.anchor.year())
            }
        }
    }

    /// Which subscription shape the view needs: day mode queries the
    /// store by date, week/month subscribe unfiltered and narrow
    /// client-side.
    pub fn filter_shape(&self) -> AgendaFilterShape {
        match self.mode {
            ViewMode::Day => AgendaFilterShape::ByDate(self.anchor),
            ViewMode::Week | ViewMode::Month => AgendaFilterShape::All,
        }
    }
}
