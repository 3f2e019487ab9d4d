// libs/agenda-cell/src/services/bootstrap.rs
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use tenant_cell::models::{Clinic, Membership};
use tenant_cell::{ClinicDirectory, MemberRole, TenantContext};

use crate::models::{AgendaError, Appointment, CreateAppointmentRequest, Specialty};
use crate::services::agenda::AgendaService;

#[derive(Debug)]
pub struct BootstrapOutcome {
    pub clinic: Clinic,
    pub owner_membership: Membership,
    pub seeded_appointments: Vec<Appointment>,
}

/// First-run setup: create the clinic, join the owner, seed demo
/// appointments. These are independent sequential calls with no rollback;
/// a failure partway leaves the earlier steps in place and surfaces as
/// the returned error.
pub struct ClinicBootstrap {
    directory: Arc<ClinicDirectory>,
    agenda: Arc<AgendaService>,
}

impl ClinicBootstrap {
    pub fn new(directory: Arc<ClinicDirectory>, agenda: Arc<AgendaService>) -> Self {
        Self { directory, agenda }
    }

    #[instrument(skip(self))]
    pub async fn bootstrap_clinic(
        &self,
        name: &str,
        owner_id: Uuid,
    ) -> Result<BootstrapOutcome, AgendaError> {
        let clinic = self.directory.create_clinic(name).await?;

        let owner_membership = self
            .directory
            .join(clinic.clinic_id(), owner_id, MemberRole::Owner)
            .await
            .map_err(|e| {
                warn!("Clinic {} created but owner join failed: {}", clinic.id, e);
                e
            })?;

        let ctx = TenantContext::for_clinic(clinic.clinic_id());
        let mut seeded_appointments = Vec::new();
        for request in Self::demo_appointments() {
            let appointment = self.agenda.create_appointment(&ctx, request).await?;
            seeded_appointments.push(appointment);
        }

        info!(
            "Bootstrapped clinic {} with {} demo appointments",
            clinic.id,
            seeded_appointments.len()
        );

        Ok(BootstrapOutcome {
            clinic,
            owner_membership,
            seeded_appointments,
        })
    }

    fn demo_appointments() -> Vec<CreateAppointmentRequest> {
        let tomorrow_morning = (Utc::now() + Duration::days(1))
            .date_naive()
            .and_hms_opt(9, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);

        vec![
            CreateAppointmentRequest {
                patient_id: Uuid::new_v4(),
                patient_name: "Maria Souza".to_string(),
                date: tomorrow_morning,
                duration_minutes: 30,
                procedure: "Consulta inicial".to_string(),
                professional: "Dra. Ana Lima".to_string(),
                specialty: Specialty::Medicine,
                notes: None,
                recurrence: None,
            },
            CreateAppointmentRequest {
                patient_id: Uuid::new_v4(),
                patient_name: "João Pereira".to_string(),
                date: tomorrow_morning + Duration::minutes(60),
                duration_minutes: 45,
                procedure: "Avaliação nutricional".to_string(),
                professional: "Dr. Carlos Mendes".to_string(),
                specialty: Specialty::Nutrition,
                notes: Some("Primeira avaliação".to_string()),
                recurrence: None,
            },
        ]
    }
}
