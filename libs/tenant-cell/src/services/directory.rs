// libs/tenant-cell/src/services/directory.rs
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use shared_models::ClinicId;
use shared_store::DocumentStore;

use crate::models::{AllClinics, Clinic, MemberRole, Membership, MembershipFilter, TenantError};
use crate::scoped::Scoped;

/// The clinics and memberships collections are global, not per-tenant, so
/// they live in a fixed directory partition of the store.
pub fn directory_scope() -> ClinicId {
    ClinicId(Uuid::nil())
}

/// Membership lookup and clinic registration. `resolve` is the single
/// entry point the rest of the system uses to turn a user into an active
/// clinic scope.
pub struct ClinicDirectory {
    clinics: Arc<dyn DocumentStore<Clinic, AllClinics>>,
    memberships: Arc<dyn DocumentStore<Membership, MembershipFilter>>,
}

impl ClinicDirectory {
    pub fn new(
        clinics: Arc<dyn DocumentStore<Clinic, AllClinics>>,
        memberships: Arc<dyn DocumentStore<Membership, MembershipFilter>>,
    ) -> Self {
        Self {
            clinics,
            memberships,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_clinic(&self, name: &str) -> Result<Clinic, TenantError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TenantError::ValidationError(
                "Clinic name cannot be empty".to_string(),
            ));
        }

        let clinic = Clinic {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };

        let clinic = self.clinics.create(directory_scope(), clinic).await?;
        info!("Created clinic {} ({})", clinic.name, clinic.id);
        Ok(clinic)
    }

    pub async fn get_clinic(&self, clinic: ClinicId) -> Result<Clinic, TenantError> {
        self.clinics
            .get_by_id(directory_scope(), clinic.0)
            .await?
            .ok_or(TenantError::ClinicNotFound)
    }

    #[instrument(skip(self))]
    pub async fn join(
        &self,
        clinic: ClinicId,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<Membership, TenantError> {
        // Joining a clinic that does not exist is a caller bug, not a race
        // worth tolerating.
        self.get_clinic(clinic).await?;

        let membership = Membership {
            id: Uuid::new_v4(),
            clinic_id: clinic,
            user_id,
            role,
            created_at: Utc::now(),
        };

        let membership = self.memberships.create(directory_scope(), membership).await?;
        info!("User {} joined clinic {} as {}", user_id, clinic, membership.role);
        Ok(membership)
    }

    /// Resolve the active clinic for a user. A user with no membership is
    /// `Unscoped` — downstream components must not issue queries for them.
    /// A store failure here means tenant resolution itself errored, and
    /// downstream subscriptions must not be attempted either.
    pub async fn resolve(&self, user_id: Uuid) -> Result<Scoped<ClinicId>, TenantError> {
        let mut memberships = self
            .memberships
            .get_all(directory_scope(), Some(MembershipFilter::ByUser(user_id)))
            .await
            .map_err(|e| {
                warn!("Tenant resolution failed for user {}: {}", user_id, e);
                TenantError::ResolutionFailed(e.to_string())
            })?;

        // Deterministic choice: earliest membership wins.
        memberships.sort_by_key(|m| m.created_at);
        match memberships.first() {
            Some(membership) => {
                debug!("Resolved user {} to clinic {}", user_id, membership.clinic_id);
                Ok(Scoped::Ready(membership.clinic_id))
            }
            None => Ok(Scoped::Unscoped),
        }
    }

    pub async fn members(&self, clinic: ClinicId) -> Result<Vec<Membership>, TenantError> {
        Ok(self
            .memberships
            .get_all(directory_scope(), Some(MembershipFilter::ByClinic(clinic)))
            .await?)
    }
}
