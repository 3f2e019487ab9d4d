// libs/agenda-cell/src/models.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use shared_store::{Document, QueryFilter};

// ==============================================================================
// CORE AGENDA MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    /// Denormalized for list rendering; the patient record stays the
    /// source of truth.
    pub patient_name: String,
    pub date: DateTime<Utc>,
    pub duration_minutes: i32,
    pub procedure: String,
    pub status: AppointmentStatus,
    pub professional: String,
    pub specialty: Specialty,
    pub notes: Option<String>,
    pub recurrence: Option<RecurrenceRule>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn end_time(&self) -> DateTime<Utc> {
        self.date + chrono::Duration::minutes(self.duration_minutes as i64)
    }

    pub fn calendar_day(&self) -> NaiveDate {
        self.date.date_naive()
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }
}

impl Document for Appointment {
    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Finished,
    Canceled,
}

impl AppointmentStatus {
    /// Tenant-facing label (the product ships in Brazilian Portuguese).
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pendente",
            AppointmentStatus::Confirmed => "Confirmado",
            AppointmentStatus::Finished => "Finalizado",
            AppointmentStatus::Canceled => "Cancelado",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Finished => write!(f, "finished"),
            AppointmentStatus::Canceled => write!(f, "canceled"),
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "finished" => Ok(AppointmentStatus::Finished),
            "canceled" | "cancelled" => Ok(AppointmentStatus::Canceled),
            other => Err(format!("Unknown appointment status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Specialty {
    Medicine,
    Nutrition,
    Psychology,
}

impl Specialty {
    pub fn label(&self) -> &'static str {
        match self {
            Specialty::Medicine => "Medicina",
            Specialty::Nutrition => "Nutrição",
            Specialty::Psychology => "Psicologia",
        }
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Specialty::Medicine => write!(f, "medicine"),
            Specialty::Nutrition => write!(f, "nutrition"),
            Specialty::Psychology => write!(f, "psychology"),
        }
    }
}

impl FromStr for Specialty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "medicine" => Ok(Specialty::Medicine),
            "nutrition" => Ok(Specialty::Nutrition),
            "psychology" => Ok(Specialty::Psychology),
            other => Err(format!("Unknown specialty: {other}")),
        }
    }
}

// ==============================================================================
// RECURRENCE MODELS
// ==============================================================================

/// How a single stored appointment expands into repeated occurrences.
/// Expansion never mutates the stored appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurrenceRule {
    pub frequency: RecurrenceFrequency,
    /// Step between occurrences in units of `frequency`. Values below 1
    /// are rejected at validation time.
    pub interval: u32,
    pub end: Option<RecurrenceEnd>,
    /// Calendar days to skip. A skipped occurrence still consumes its
    /// index, so indices stay stable when exceptions change.
    #[serde(default)]
    pub exceptions: Vec<NaiveDate>,
}

impl RecurrenceRule {
    pub fn weekly() -> Self {
        Self {
            frequency: RecurrenceFrequency::Weekly,
            interval: 1,
            end: None,
            exceptions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceFrequency {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceEnd {
    /// Total number of occurrences in the series, the first included.
    Count(u32),
    /// Last admissible calendar day, inclusive.
    Until(NaiveDate),
}

/// Identity of one expanded occurrence. A value type, not a concatenated
/// string, so series and occurrence can never be confused.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct OccurrenceId {
    pub base_id: Uuid,
    pub occurrence_index: u32,
}

impl fmt::Display for OccurrenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.base_id, self.occurrence_index)
    }
}

/// A synthetic, display-ready instance of an appointment. `appointment`
/// is a structural copy of the base with the occurrence date substituted;
/// `id.base_id` points back at the stored series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: OccurrenceId,
    pub appointment: Appointment,
}

impl Occurrence {
    pub fn date(&self) -> DateTime<Utc> {
        self.appointment.date
    }
}

// ==============================================================================
// DATE WINDOW
// ==============================================================================

/// Half-open calendar-day range: `start` inclusive, `end` exclusive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day < self.end
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_id: Uuid,
    pub patient_name: String,
    pub date: DateTime<Utc>,
    pub duration_minutes: i32,
    pub procedure: String,
    pub professional: String,
    pub specialty: Specialty,
    pub notes: Option<String>,
    pub recurrence: Option<RecurrenceRule>,
}

/// Partial update; absent fields keep their stored value. Date and
/// duration only ever change through this explicit call. `notes` and
/// `recurrence` are removed through the clear flags, which win over a
/// value supplied in the same patch; clearing the recurrence turns the
/// series back into a one-off appointment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub patient_name: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub procedure: Option<String>,
    pub professional: Option<String>,
    pub specialty: Option<Specialty>,
    pub notes: Option<String>,
    pub recurrence: Option<RecurrenceRule>,
    #[serde(default)]
    pub clear_notes: bool,
    #[serde(default)]
    pub clear_recurrence: bool,
}

// ==============================================================================
// SUBSCRIPTION FILTER SHAPES
// ==============================================================================

/// The current query shape of a live appointment subscription. Exactly
/// one shape is active at a time; changing it is a resubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgendaFilterShape {
    All,
    ByDate(NaiveDate),
    ByPatient(Uuid),
}

impl QueryFilter<Appointment> for AgendaFilterShape {
    fn matches(&self, doc: &Appointment) -> bool {
        match self {
            AgendaFilterShape::All => true,
            AgendaFilterShape::ByDate(day) => doc.calendar_day() == *day,
            AgendaFilterShape::ByPatient(patient_id) => doc.patient_id == *patient_id,
        }
    }
}

// ==============================================================================
// CLINIC TASK MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

impl TaskPriority {
    /// Ascending rank equals descending urgency.
    pub fn rank(&self) -> u8 {
        match self {
            TaskPriority::High => 0,
            TaskPriority::Medium => 1,
            TaskPriority::Low => 2,
        }
    }
}

/// Reception to-do item ("pendência"), the priority-bearing list in the
/// product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicTask {
    pub id: Uuid,
    pub title: String,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

impl Document for ClinicTask {
    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AgendaError {
    #[error("Appointment not found")]
    NotFound,

    #[error("No clinic selected")]
    NoClinicSelected,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Appointment cannot move from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Store error: {0}")]
    Store(String),
}

impl From<shared_store::StoreError> for AgendaError {
    fn from(err: shared_store::StoreError) -> Self {
        match err {
            shared_store::StoreError::NotFound => AgendaError::NotFound,
            other => AgendaError::Store(other.to_string()),
        }
    }
}

impl From<tenant_cell::TenantError> for AgendaError {
    fn from(err: tenant_cell::TenantError) -> Self {
        use tenant_cell::TenantError;
        match err {
            TenantError::NoClinicSelected => AgendaError::NoClinicSelected,
            TenantError::ClinicNotFound => AgendaError::NotFound,
            TenantError::ValidationError(msg) => AgendaError::ValidationError(msg),
            TenantError::ResolutionFailed(msg) | TenantError::Store(msg) => {
                AgendaError::Store(msg)
            }
        }
    }
}

impl From<AgendaError> for shared_models::AppError {
    fn from(err: AgendaError) -> Self {
        use shared_models::AppError;
        match &err {
            AgendaError::NotFound => AppError::NotFound(err.to_string()),
            AgendaError::NoClinicSelected => AppError::Precondition(err.to_string()),
            AgendaError::ValidationError(_) => AppError::ValidationError(err.to_string()),
            AgendaError::InvalidStatusTransition { .. } => AppError::Conflict(err.to_string()),
            AgendaError::Store(_) => AppError::Store(err.to_string()),
        }
    }
}
