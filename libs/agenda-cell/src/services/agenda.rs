// libs/agenda-cell/src/services/agenda.rs
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, instrument};
use uuid::Uuid;

use shared_store::DocumentStore;
use tenant_cell::TenantContext;

use crate::models::{
    AgendaError, AgendaFilterShape, Appointment, AppointmentStatus, CreateAppointmentRequest,
    OccurrenceId, UpdateAppointmentRequest,
};
use crate::services::lifecycle::AppointmentLifecycle;
use crate::services::recurrence;

/// Appointment mutations and one-shot reads. Every operation requires a
/// resolved clinic scope before it touches the store; scoping failures
/// are raised synchronously with zero store calls issued. The store is
/// the single source of truth: mutations go straight to it and the live
/// subscription reflects them back, so nothing here caches.
pub struct AgendaService {
    appointments: Arc<dyn DocumentStore<Appointment, AgendaFilterShape>>,
}

impl AgendaService {
    pub fn new(appointments: Arc<dyn DocumentStore<Appointment, AgendaFilterShape>>) -> Self {
        Self { appointments }
    }

    #[instrument(skip(self, ctx, request), fields(patient_id = %request.patient_id))]
    pub async fn create_appointment(
        &self,
        ctx: &TenantContext,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AgendaError> {
        let clinic = ctx.require_clinic()?;
        Self::validate_create(&request)?;

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            patient_name: request.patient_name.trim().to_string(),
            date: request.date,
            duration_minutes: request.duration_minutes,
            procedure: request.procedure.trim().to_string(),
            status: AppointmentStatus::Pending,
            professional: request.professional.trim().to_string(),
            specialty: request.specialty,
            notes: request.notes,
            recurrence: request.recurrence,
            created_at: now,
            updated_at: now,
        };

        let created = self.appointments.create(clinic, appointment).await?;
        info!("Created appointment {} for clinic {}", created.id, clinic);
        Ok(created)
    }

    pub async fn get_appointment(
        &self,
        ctx: &TenantContext,
        id: Uuid,
    ) -> Result<Appointment, AgendaError> {
        let clinic = ctx.require_clinic()?;
        self.appointments
            .get_by_id(clinic, id)
            .await?
            .ok_or(AgendaError::NotFound)
    }

    pub async fn all_appointments(
        &self,
        ctx: &TenantContext,
    ) -> Result<Vec<Appointment>, AgendaError> {
        let clinic = ctx.require_clinic()?;
        Ok(self.appointments.get_all(clinic, None).await?)
    }

    pub async fn appointments_for_day(
        &self,
        ctx: &TenantContext,
        day: NaiveDate,
    ) -> Result<Vec<Appointment>, AgendaError> {
        let clinic = ctx.require_clinic()?;
        Ok(self
            .appointments
            .get_all(clinic, Some(AgendaFilterShape::ByDate(day)))
            .await?)
    }

    pub async fn appointments_for_patient(
        &self,
        ctx: &TenantContext,
        patient_id: Uuid,
    ) -> Result<Vec<Appointment>, AgendaError> {
        let clinic = ctx.require_clinic()?;
        Ok(self
            .appointments
            .get_all(clinic, Some(AgendaFilterShape::ByPatient(patient_id)))
            .await?)
    }

    /// Partial update. Absent fields keep their stored value; the merged
    /// document is re-validated before it is written.
    #[instrument(skip(self, ctx, patch))]
    pub async fn update_appointment(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        patch: UpdateAppointmentRequest,
    ) -> Result<Appointment, AgendaError> {
        let clinic = ctx.require_clinic()?;
        let mut appointment = self
            .appointments
            .get_by_id(clinic, id)
            .await?
            .ok_or(AgendaError::NotFound)?;

        if let Some(patient_name) = patch.patient_name {
            appointment.patient_name = patient_name;
        }
        if let Some(date) = patch.date {
            appointment.date = date;
        }
        if let Some(duration_minutes) = patch.duration_minutes {
            appointment.duration_minutes = duration_minutes;
        }
        if let Some(procedure) = patch.procedure {
            appointment.procedure = procedure;
        }
        if let Some(professional) = patch.professional {
            appointment.professional = professional;
        }
        if let Some(specialty) = patch.specialty {
            appointment.specialty = specialty;
        }
        if let Some(notes) = patch.notes {
            appointment.notes = Some(notes);
        }
        if let Some(recurrence) = patch.recurrence {
            appointment.recurrence = Some(recurrence);
        }
        if patch.clear_notes {
            appointment.notes = None;
        }
        if patch.clear_recurrence {
            appointment.recurrence = None;
        }

        Self::validate_fields(
            &appointment.procedure,
            appointment.duration_minutes,
            appointment.recurrence.as_ref().map(|r| r.interval),
        )?;

        appointment.updated_at = Utc::now();
        Ok(self.appointments.update(clinic, appointment).await?)
    }

    /// Status transition with lifecycle validation. Soft visibility
    /// changes (cancel, finish) go through here rather than deletion.
    #[instrument(skip(self, ctx))]
    pub async fn set_status(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        new_status: AppointmentStatus,
    ) -> Result<Appointment, AgendaError> {
        let clinic = ctx.require_clinic()?;
        let mut appointment = self
            .appointments
            .get_by_id(clinic, id)
            .await?
            .ok_or(AgendaError::NotFound)?;

        AppointmentLifecycle::validate_transition(&appointment.status, &new_status)?;

        appointment.status = new_status;
        appointment.updated_at = Utc::now();
        let updated = self.appointments.update(clinic, appointment).await?;
        info!("Appointment {} moved to {}", updated.id, updated.status);
        Ok(updated)
    }

    /// Cancel a single occurrence of a recurring series by adding its day
    /// to the rule's exception list. The series itself stays untouched;
    /// series-level edits go through `update_appointment`.
    #[instrument(skip(self, ctx), fields(occurrence = %occurrence))]
    pub async fn cancel_occurrence(
        &self,
        ctx: &TenantContext,
        occurrence: OccurrenceId,
    ) -> Result<Appointment, AgendaError> {
        let clinic = ctx.require_clinic()?;
        let mut appointment = self
            .appointments
            .get_by_id(clinic, occurrence.base_id)
            .await?
            .ok_or(AgendaError::NotFound)?;

        if appointment.recurrence.is_none() {
            return Err(AgendaError::ValidationError(
                "Appointment is not recurring".to_string(),
            ));
        }

        let date = recurrence::occurrence_date(&appointment, occurrence.occurrence_index)
            .ok_or_else(|| {
                AgendaError::ValidationError(format!(
                    "Occurrence {} is outside the series",
                    occurrence.occurrence_index
                ))
            })?;

        let day = date.date_naive();
        if let Some(rule) = appointment.recurrence.as_mut() {
            if !rule.exceptions.contains(&day) {
                rule.exceptions.push(day);
                rule.exceptions.sort();
            }
        }

        appointment.updated_at = Utc::now();
        let updated = self.appointments.update(clinic, appointment).await?;
        info!("Canceled occurrence {} on {}", occurrence, day);
        Ok(updated)
    }

    /// Hard delete. Most flows cancel instead; this removes the document.
    #[instrument(skip(self, ctx))]
    pub async fn delete_appointment(
        &self,
        ctx: &TenantContext,
        id: Uuid,
    ) -> Result<(), AgendaError> {
        let clinic = ctx.require_clinic()?;
        self.appointments.delete(clinic, id).await?;
        info!("Deleted appointment {} from clinic {}", id, clinic);
        Ok(())
    }

    fn validate_create(request: &CreateAppointmentRequest) -> Result<(), AgendaError> {
        if request.patient_id.is_nil() {
            return Err(AgendaError::ValidationError(
                "A patient is required".to_string(),
            ));
        }
        Self::validate_fields(
            &request.procedure,
            request.duration_minutes,
            request.recurrence.as_ref().map(|r| r.interval),
        )
    }

    fn validate_fields(
        procedure: &str,
        duration_minutes: i32,
        recurrence_interval: Option<u32>,
    ) -> Result<(), AgendaError> {
        if procedure.trim().is_empty() {
            return Err(AgendaError::ValidationError(
                "Procedure cannot be empty".to_string(),
            ));
        }
        if duration_minutes <= 0 {
            return Err(AgendaError::ValidationError(
                "Duration must be positive".to_string(),
            ));
        }
        if let Some(interval) = recurrence_interval {
            if interval == 0 {
                return Err(AgendaError::ValidationError(
                    "Recurrence interval must be at least 1".to_string(),
                ));
            }
        }
        Ok(())
    }
}
