// libs/agenda-cell/src/handlers.rs
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::{AppError, ClinicId};
use tenant_cell::TenantContext;

use crate::models::{
    AppointmentStatus, CreateAppointmentRequest, OccurrenceId, UpdateAppointmentRequest,
};
use crate::services::agenda::AgendaService;
use crate::services::bootstrap::ClinicBootstrap;
use crate::services::calendar::{CalendarState, ViewMode};
use crate::services::filters::AgendaFilter;
use crate::services::recurrence;

#[derive(Clone)]
pub struct AgendaState {
    pub agenda: Arc<AgendaService>,
    pub bootstrap: Arc<ClinicBootstrap>,
}

// ==============================================================================
// REQUEST/QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct BootstrapClinicRequest {
    pub name: String,
    pub owner_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentListQuery {
    pub date: Option<NaiveDate>,
    pub patient_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct AgendaWindowQuery {
    pub anchor: NaiveDate,
    /// day | week | month
    pub mode: String,
    /// Comma-separated status selection; empty means unrestricted.
    pub statuses: Option<String>,
    /// Comma-separated specialty selection; empty means unrestricted.
    pub specialties: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: AppointmentStatus,
}

// ==============================================================================
// CLINIC HANDLERS
// ==============================================================================

pub async fn bootstrap_clinic(
    State(state): State<AgendaState>,
    Json(request): Json<BootstrapClinicRequest>,
) -> Result<Json<Value>, AppError> {
    let outcome = state
        .bootstrap
        .bootstrap_clinic(&request.name, request.owner_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "clinic": outcome.clinic,
        "owner_membership": outcome.owner_membership,
        "seeded_appointments": outcome.seeded_appointments.len(),
    })))
}

// ==============================================================================
// APPOINTMENT HANDLERS
// ==============================================================================

pub async fn create_appointment(
    State(state): State<AgendaState>,
    Path(clinic_id): Path<Uuid>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let ctx = TenantContext::for_clinic(ClinicId(clinic_id));
    let appointment = state.agenda.create_appointment(&ctx, request).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
    })))
}

pub async fn get_appointment(
    State(state): State<AgendaState>,
    Path((clinic_id, appointment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    let ctx = TenantContext::for_clinic(ClinicId(clinic_id));
    let appointment = state.agenda.get_appointment(&ctx, appointment_id).await?;

    Ok(Json(json!({ "appointment": appointment })))
}

pub async fn list_appointments(
    State(state): State<AgendaState>,
    Path(clinic_id): Path<Uuid>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<Value>, AppError> {
    let ctx = TenantContext::for_clinic(ClinicId(clinic_id));

    let appointments = match (query.date, query.patient_id) {
        (Some(day), _) => state.agenda.appointments_for_day(&ctx, day).await?,
        (None, Some(patient_id)) => {
            state.agenda.appointments_for_patient(&ctx, patient_id).await?
        }
        (None, None) => state.agenda.all_appointments(&ctx).await?,
    };

    Ok(Json(json!({
        "count": appointments.len(),
        "appointments": appointments,
    })))
}

pub async fn update_appointment(
    State(state): State<AgendaState>,
    Path((clinic_id, appointment_id)): Path<(Uuid, Uuid)>,
    Json(patch): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let ctx = TenantContext::for_clinic(ClinicId(clinic_id));
    let appointment = state
        .agenda
        .update_appointment(&ctx, appointment_id, patch)
        .await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
    })))
}

pub async fn update_appointment_status(
    State(state): State<AgendaState>,
    Path((clinic_id, appointment_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    let ctx = TenantContext::for_clinic(ClinicId(clinic_id));
    let appointment = state
        .agenda
        .set_status(&ctx, appointment_id, request.status)
        .await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "status_label": appointment.status.label(),
    })))
}

pub async fn cancel_occurrence(
    State(state): State<AgendaState>,
    Path((clinic_id, appointment_id, occurrence_index)): Path<(Uuid, Uuid, u32)>,
) -> Result<Json<Value>, AppError> {
    let ctx = TenantContext::for_clinic(ClinicId(clinic_id));
    let appointment = state
        .agenda
        .cancel_occurrence(
            &ctx,
            OccurrenceId {
                base_id: appointment_id,
                occurrence_index,
            },
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
    })))
}

pub async fn delete_appointment(
    State(state): State<AgendaState>,
    Path((clinic_id, appointment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    let ctx = TenantContext::for_clinic(ClinicId(clinic_id));
    state.agenda.delete_appointment(&ctx, appointment_id).await?;

    Ok(Json(json!({ "success": true })))
}

/// One-shot render of an agenda window: recurrences expanded over the
/// requested view, client filters applied.
pub async fn agenda_window(
    State(state): State<AgendaState>,
    Path(clinic_id): Path<Uuid>,
    Query(query): Query<AgendaWindowQuery>,
) -> Result<Json<Value>, AppError> {
    let ctx = TenantContext::for_clinic(ClinicId(clinic_id));

    let mode = match query.mode.to_ascii_lowercase().as_str() {
        "day" => ViewMode::Day,
        "week" => ViewMode::Week,
        "month" => ViewMode::Month,
        other => {
            return Err(AppError::BadRequest(format!("Unknown view mode: {other}")));
        }
    };

    let filter = AgendaFilter {
        statuses: parse_list(query.statuses.as_deref())?,
        specialties: parse_list(query.specialties.as_deref())?,
    };

    let calendar = CalendarState::new(query.anchor, mode);
    let appointments = state.agenda.all_appointments(&ctx).await?;
    let expanded = recurrence::expand(&appointments, calendar.window());
    let occurrences = filter.apply_occurrences(&expanded);

    Ok(Json(json!({
        "label": calendar.label(),
        "window": calendar.window(),
        "count": occurrences.len(),
        "occurrences": occurrences,
    })))
}

fn parse_list<T: FromStr<Err = String>>(raw: Option<&str>) -> Result<Vec<T>, AppError> {
    match raw {
        None => Ok(Vec::new()),
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| T::from_str(s).map_err(AppError::BadRequest))
            .collect(),
    }
}
