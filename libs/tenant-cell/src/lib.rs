// libs/tenant-cell/src/lib.rs
//
// Tenant resolution: which clinic scopes the current caller's queries.
// Consumers receive a `TenantContext` explicitly; nothing here is ambient
// global state.

pub mod models;
pub mod scoped;
pub mod services;

pub use models::{Clinic, Membership, MemberRole, TenantError};
pub use scoped::Scoped;
pub use services::directory::ClinicDirectory;

use shared_models::ClinicId;

/// Explicit carrier of the active tenant scope. Services take this as an
/// argument and must refuse to issue any store call while it is unscoped.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext {
    clinic: Scoped<ClinicId>,
}

impl TenantContext {
    pub fn for_clinic(clinic: ClinicId) -> Self {
        Self {
            clinic: Scoped::Ready(clinic),
        }
    }

    pub fn unscoped() -> Self {
        Self {
            clinic: Scoped::Unscoped,
        }
    }

    pub fn from_resolution(clinic: Scoped<ClinicId>) -> Self {
        Self { clinic }
    }

    pub fn clinic(&self) -> Scoped<ClinicId> {
        self.clinic
    }

    pub fn require_clinic(&self) -> Result<ClinicId, TenantError> {
        match self.clinic {
            Scoped::Ready(clinic) => Ok(clinic),
            Scoped::Unscoped => Err(TenantError::NoClinicSelected),
        }
    }
}
