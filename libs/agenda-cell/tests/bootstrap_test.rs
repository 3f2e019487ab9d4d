// libs/agenda-cell/tests/bootstrap_test.rs
use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use uuid::Uuid;

use agenda_cell::models::{AgendaError, AgendaFilterShape, Appointment};
use agenda_cell::services::agenda::AgendaService;
use agenda_cell::services::bootstrap::ClinicBootstrap;
use shared_models::ClinicId;
use shared_store::{
    DataListener, DocumentStore, ErrorListener, InMemoryStore, StoreError, SubscriptionHandle,
};
use tenant_cell::models::{AllClinics, Clinic, Membership, MembershipFilter};
use tenant_cell::{ClinicDirectory, MemberRole, Scoped, TenantContext};

fn bootstrap() -> (ClinicBootstrap, Arc<ClinicDirectory>, Arc<AgendaService>) {
    let clinics: Arc<InMemoryStore<Clinic, AllClinics>> = Arc::new(InMemoryStore::new());
    let memberships: Arc<InMemoryStore<Membership, MembershipFilter>> =
        Arc::new(InMemoryStore::new());
    let appointments: Arc<InMemoryStore<Appointment, AgendaFilterShape>> =
        Arc::new(InMemoryStore::new());

    let directory = Arc::new(ClinicDirectory::new(clinics, memberships));
    let agenda = Arc::new(AgendaService::new(appointments));
    (
        ClinicBootstrap::new(Arc::clone(&directory), Arc::clone(&agenda)),
        directory,
        agenda,
    )
}

#[tokio::test]
async fn bootstrap_creates_clinic_owner_and_demo_agenda() {
    let (bootstrap, directory, agenda) = bootstrap();
    let owner_id = Uuid::new_v4();

    let outcome = bootstrap
        .bootstrap_clinic("Clínica Bem Viver", owner_id)
        .await
        .unwrap();

    assert_eq!(outcome.clinic.name, "Clínica Bem Viver");
    assert_eq!(outcome.owner_membership.user_id, owner_id);
    assert_eq!(outcome.owner_membership.role, MemberRole::Owner);
    assert_eq!(outcome.seeded_appointments.len(), 2);

    // The owner now resolves to the new clinic.
    let scope = directory.resolve(owner_id).await.unwrap();
    assert_eq!(scope, Scoped::Ready(outcome.clinic.clinic_id()));

    // The demo appointments are visible through the agenda.
    let ctx = TenantContext::for_clinic(outcome.clinic.clinic_id());
    let stored = agenda.all_appointments(&ctx).await.unwrap();
    assert_eq!(stored.len(), 2);
}

/// Membership store whose writes always fail, to observe what an
/// interrupted bootstrap leaves behind.
struct BrokenMembershipStore;

#[async_trait]
impl DocumentStore<Membership, MembershipFilter> for BrokenMembershipStore {
    async fn get_by_id(
        &self,
        _clinic: ClinicId,
        _id: Uuid,
    ) -> Result<Option<Membership>, StoreError> {
        Ok(None)
    }

    async fn get_all(
        &self,
        _clinic: ClinicId,
        _filter: Option<MembershipFilter>,
    ) -> Result<Vec<Membership>, StoreError> {
        Ok(Vec::new())
    }

    async fn create(
        &self,
        _clinic: ClinicId,
        _doc: Membership,
    ) -> Result<Membership, StoreError> {
        Err(StoreError::Backend("membership write refused".to_string()))
    }

    async fn update(
        &self,
        _clinic: ClinicId,
        _doc: Membership,
    ) -> Result<Membership, StoreError> {
        Err(StoreError::Backend("membership write refused".to_string()))
    }

    async fn delete(&self, _clinic: ClinicId, _id: Uuid) -> Result<(), StoreError> {
        Err(StoreError::Backend("membership write refused".to_string()))
    }

    async fn subscribe(
        &self,
        _clinic: ClinicId,
        _filter: Option<MembershipFilter>,
        _on_data: DataListener<Membership>,
        _on_error: Option<ErrorListener>,
    ) -> SubscriptionHandle {
        SubscriptionHandle::new(|| {})
    }
}

#[tokio::test]
async fn failed_owner_join_surfaces_and_leaves_the_clinic_in_place() {
    let clinics: Arc<InMemoryStore<Clinic, AllClinics>> = Arc::new(InMemoryStore::new());
    let appointments: Arc<InMemoryStore<Appointment, AgendaFilterShape>> =
        Arc::new(InMemoryStore::new());
    let directory = Arc::new(ClinicDirectory::new(
        Arc::clone(&clinics) as Arc<dyn DocumentStore<Clinic, AllClinics>>,
        Arc::new(BrokenMembershipStore),
    ));
    let agenda = Arc::new(AgendaService::new(appointments));
    let bootstrap = ClinicBootstrap::new(Arc::clone(&directory), agenda);

    let result = bootstrap.bootstrap_clinic("Clínica Sol", Uuid::new_v4()).await;

    assert_matches!(result, Err(AgendaError::Store(_)));
    // No rollback: the clinic created before the failure stays.
    let stored = clinics
        .get_all(tenant_cell::services::directory::directory_scope(), None)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Clínica Sol");
}

#[tokio::test]
async fn bootstrap_rejects_an_empty_clinic_name() {
    let (bootstrap, directory, _) = bootstrap();

    let result = bootstrap.bootstrap_clinic("   ", Uuid::new_v4()).await;

    assert_matches!(result, Err(AgendaError::ValidationError(_)));
    // Nothing was created for the failed attempt.
    let resolution = directory.resolve(Uuid::new_v4()).await.unwrap();
    assert_eq!(resolution, Scoped::Unscoped);
}
