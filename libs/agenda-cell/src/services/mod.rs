pub mod agenda;
pub mod bootstrap;
pub mod calendar;
pub mod filters;
pub mod lifecycle;
pub mod recurrence;
pub mod view;
