use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Tenant partition key. Every query, subscription and mutation is scoped
/// by a clinic id; there is no cross-tenant visibility at any layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClinicId(pub Uuid);

impl ClinicId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClinicId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClinicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for ClinicId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}
