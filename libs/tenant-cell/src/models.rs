// libs/tenant-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_models::ClinicId;
use shared_store::{Document, QueryFilter};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clinic {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Clinic {
    pub fn clinic_id(&self) -> ClinicId {
        ClinicId(self.id)
    }
}

impl Document for Clinic {
    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub id: Uuid,
    pub clinic_id: ClinicId,
    pub user_id: Uuid,
    pub role: MemberRole,
    pub created_at: DateTime<Utc>,
}

impl Document for Membership {
    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Owner,
    Professional,
    Reception,
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberRole::Owner => write!(f, "owner"),
            MemberRole::Professional => write!(f, "professional"),
            MemberRole::Reception => write!(f, "reception"),
        }
    }
}

/// Filter shapes for the directory collections.
#[derive(Debug, Clone)]
pub struct AllClinics;

impl QueryFilter<Clinic> for AllClinics {
    fn matches(&self, _doc: &Clinic) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
pub enum MembershipFilter {
    ByUser(Uuid),
    ByClinic(ClinicId),
}

impl QueryFilter<Membership> for MembershipFilter {
    fn matches(&self, doc: &Membership) -> bool {
        match self {
            MembershipFilter::ByUser(user_id) => doc.user_id == *user_id,
            MembershipFilter::ByClinic(clinic_id) => doc.clinic_id == *clinic_id,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TenantError {
    #[error("No clinic selected")]
    NoClinicSelected,

    #[error("Clinic not found")]
    ClinicNotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Tenant resolution failed: {0}")]
    ResolutionFailed(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl From<shared_store::StoreError> for TenantError {
    fn from(err: shared_store::StoreError) -> Self {
        TenantError::Store(err.to_string())
    }
}
