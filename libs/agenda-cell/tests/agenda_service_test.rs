// libs/agenda-cell/tests/agenda_service_test.rs
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use agenda_cell::models::{
    AgendaError, AgendaFilterShape, Appointment, AppointmentStatus, CreateAppointmentRequest,
    OccurrenceId, RecurrenceEnd, RecurrenceRule, Specialty, UpdateAppointmentRequest,
};
use agenda_cell::services::agenda::AgendaService;
use shared_models::ClinicId;
use shared_store::{
    DataListener, DocumentStore, ErrorListener, InMemoryStore, StoreError, SubscriptionHandle,
};
use tenant_cell::TenantContext;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32, hour: u32) -> DateTime<Utc> {
    day(y, m, d).and_hms_opt(hour, 0, 0).unwrap().and_utc()
}

fn create_request() -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        patient_id: Uuid::new_v4(),
        patient_name: "  Maria Souza  ".to_string(),
        date: at(2025, 6, 10, 9),
        duration_minutes: 30,
        procedure: " Consulta inicial ".to_string(),
        professional: "Dra. Ana Lima".to_string(),
        specialty: Specialty::Medicine,
        notes: None,
        recurrence: None,
    }
}

fn service() -> (AgendaService, TenantContext) {
    let store: Arc<dyn DocumentStore<Appointment, AgendaFilterShape>> =
        Arc::new(InMemoryStore::new());
    let ctx = TenantContext::for_clinic(ClinicId::new());
    (AgendaService::new(store), ctx)
}

/// Store double that only counts calls; any call at all fails the
/// scoping tests.
struct CountingStore {
    calls: AtomicUsize,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore<Appointment, AgendaFilterShape> for CountingStore {
    async fn get_by_id(
        &self,
        _clinic: ClinicId,
        _id: Uuid,
    ) -> Result<Option<Appointment>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }

    async fn get_all(
        &self,
        _clinic: ClinicId,
        _filter: Option<AgendaFilterShape>,
    ) -> Result<Vec<Appointment>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    async fn create(&self, _clinic: ClinicId, doc: Appointment) -> Result<Appointment, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(doc)
    }

    async fn update(&self, _clinic: ClinicId, doc: Appointment) -> Result<Appointment, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(doc)
    }

    async fn delete(&self, _clinic: ClinicId, _id: Uuid) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn subscribe(
        &self,
        _clinic: ClinicId,
        _filter: Option<AgendaFilterShape>,
        _on_data: DataListener<Appointment>,
        _on_error: Option<ErrorListener>,
    ) -> SubscriptionHandle {
        self.calls.fetch_add(1, Ordering::SeqCst);
        SubscriptionHandle::new(|| {})
    }
}

#[tokio::test]
async fn create_without_clinic_scope_fails_before_any_store_call() {
    let store = Arc::new(CountingStore::new());
    let service = AgendaService::new(Arc::clone(&store) as Arc<dyn DocumentStore<Appointment, AgendaFilterShape>>);
    let ctx = TenantContext::unscoped();

    let result = service.create_appointment(&ctx, create_request()).await;

    assert_matches!(result, Err(AgendaError::NoClinicSelected));
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn reads_without_clinic_scope_fail_before_any_store_call() {
    let store = Arc::new(CountingStore::new());
    let service = AgendaService::new(Arc::clone(&store) as Arc<dyn DocumentStore<Appointment, AgendaFilterShape>>);
    let ctx = TenantContext::unscoped();

    assert_matches!(
        service.all_appointments(&ctx).await,
        Err(AgendaError::NoClinicSelected)
    );
    assert_matches!(
        service.get_appointment(&ctx, Uuid::new_v4()).await,
        Err(AgendaError::NoClinicSelected)
    );
    assert_matches!(
        service.delete_appointment(&ctx, Uuid::new_v4()).await,
        Err(AgendaError::NoClinicSelected)
    );
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn create_starts_pending_and_trims_text_fields() {
    let (service, ctx) = service();

    let created = service
        .create_appointment(&ctx, create_request())
        .await
        .unwrap();

    assert_eq!(created.status, AppointmentStatus::Pending);
    assert_eq!(created.patient_name, "Maria Souza");
    assert_eq!(created.procedure, "Consulta inicial");

    let fetched = service.get_appointment(&ctx, created.id).await.unwrap();
    assert_eq!(fetched.id, created.id);
}

#[tokio::test]
async fn create_rejects_invalid_requests() {
    let (service, ctx) = service();

    let mut nil_patient = create_request();
    nil_patient.patient_id = Uuid::nil();
    assert_matches!(
        service.create_appointment(&ctx, nil_patient).await,
        Err(AgendaError::ValidationError(_))
    );

    let mut empty_procedure = create_request();
    empty_procedure.procedure = "   ".to_string();
    assert_matches!(
        service.create_appointment(&ctx, empty_procedure).await,
        Err(AgendaError::ValidationError(_))
    );

    let mut zero_duration = create_request();
    zero_duration.duration_minutes = 0;
    assert_matches!(
        service.create_appointment(&ctx, zero_duration).await,
        Err(AgendaError::ValidationError(_))
    );

    let mut zero_interval = create_request();
    zero_interval.recurrence = Some(RecurrenceRule {
        interval: 0,
        ..RecurrenceRule::weekly()
    });
    assert_matches!(
        service.create_appointment(&ctx, zero_interval).await,
        Err(AgendaError::ValidationError(_))
    );
}

#[tokio::test]
async fn get_unknown_appointment_is_not_found() {
    let (service, ctx) = service();
    assert_matches!(
        service.get_appointment(&ctx, Uuid::new_v4()).await,
        Err(AgendaError::NotFound)
    );
}

#[tokio::test]
async fn clinic_partitions_are_isolated() {
    let store: Arc<dyn DocumentStore<Appointment, AgendaFilterShape>> =
        Arc::new(InMemoryStore::new());
    let service = AgendaService::new(store);
    let ctx_a = TenantContext::for_clinic(ClinicId::new());
    let ctx_b = TenantContext::for_clinic(ClinicId::new());

    let created = service
        .create_appointment(&ctx_a, create_request())
        .await
        .unwrap();

    assert_matches!(
        service.get_appointment(&ctx_b, created.id).await,
        Err(AgendaError::NotFound)
    );
    assert!(service.all_appointments(&ctx_b).await.unwrap().is_empty());
}

#[tokio::test]
async fn day_and_patient_queries_narrow_results() {
    let (service, ctx) = service();

    let mut on_target_day = create_request();
    on_target_day.date = at(2025, 6, 10, 9);
    let target = service
        .create_appointment(&ctx, on_target_day)
        .await
        .unwrap();

    let mut other_day = create_request();
    other_day.date = at(2025, 6, 11, 9);
    service.create_appointment(&ctx, other_day).await.unwrap();

    let for_day = service
        .appointments_for_day(&ctx, day(2025, 6, 10))
        .await
        .unwrap();
    assert_eq!(for_day.len(), 1);
    assert_eq!(for_day[0].id, target.id);

    let for_patient = service
        .appointments_for_patient(&ctx, target.patient_id)
        .await
        .unwrap();
    assert_eq!(for_patient.len(), 1);
    assert_eq!(for_patient[0].id, target.id);
}

#[tokio::test]
async fn update_merges_only_provided_fields() {
    let (service, ctx) = service();
    let created = service
        .create_appointment(&ctx, create_request())
        .await
        .unwrap();

    let updated = service
        .update_appointment(
            &ctx,
            created.id,
            UpdateAppointmentRequest {
                procedure: Some("Retorno".to_string()),
                duration_minutes: Some(45),
                ..UpdateAppointmentRequest::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.procedure, "Retorno");
    assert_eq!(updated.duration_minutes, 45);
    assert_eq!(updated.patient_name, created.patient_name);
    assert_eq!(updated.date, created.date);
    assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
async fn clear_flags_remove_notes_and_turn_a_series_into_a_one_off() {
    let (service, ctx) = service();
    let mut request = create_request();
    request.notes = Some("Trazer exames".to_string());
    request.recurrence = Some(RecurrenceRule::weekly());
    let created = service.create_appointment(&ctx, request).await.unwrap();
    assert!(created.is_recurring());

    let updated = service
        .update_appointment(
            &ctx,
            created.id,
            UpdateAppointmentRequest {
                clear_notes: true,
                clear_recurrence: true,
                ..UpdateAppointmentRequest::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.notes, None);
    assert!(!updated.is_recurring());

    // The clear flag wins over a value supplied in the same patch.
    let still_plain = service
        .update_appointment(
            &ctx,
            created.id,
            UpdateAppointmentRequest {
                recurrence: Some(RecurrenceRule::weekly()),
                clear_recurrence: true,
                ..UpdateAppointmentRequest::default()
            },
        )
        .await
        .unwrap();
    assert!(!still_plain.is_recurring());
}

#[tokio::test]
async fn update_revalidates_the_merged_document() {
    let (service, ctx) = service();
    let created = service
        .create_appointment(&ctx, create_request())
        .await
        .unwrap();

    let result = service
        .update_appointment(
            &ctx,
            created.id,
            UpdateAppointmentRequest {
                duration_minutes: Some(-15),
                ..UpdateAppointmentRequest::default()
            },
        )
        .await;

    assert_matches!(result, Err(AgendaError::ValidationError(_)));
}

#[tokio::test]
async fn status_follows_the_lifecycle() {
    let (service, ctx) = service();
    let created = service
        .create_appointment(&ctx, create_request())
        .await
        .unwrap();

    let confirmed = service
        .set_status(&ctx, created.id, AppointmentStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

    let finished = service
        .set_status(&ctx, created.id, AppointmentStatus::Finished)
        .await
        .unwrap();
    assert_eq!(finished.status, AppointmentStatus::Finished);
}

#[tokio::test]
async fn pending_cannot_jump_straight_to_finished() {
    let (service, ctx) = service();
    let created = service
        .create_appointment(&ctx, create_request())
        .await
        .unwrap();

    let result = service
        .set_status(&ctx, created.id, AppointmentStatus::Finished)
        .await;

    assert_matches!(
        result,
        Err(AgendaError::InvalidStatusTransition {
            from: AppointmentStatus::Pending,
            to: AppointmentStatus::Finished,
        })
    );
}

#[tokio::test]
async fn canceled_is_terminal() {
    let (service, ctx) = service();
    let created = service
        .create_appointment(&ctx, create_request())
        .await
        .unwrap();

    service
        .set_status(&ctx, created.id, AppointmentStatus::Canceled)
        .await
        .unwrap();

    assert_matches!(
        service
            .set_status(&ctx, created.id, AppointmentStatus::Confirmed)
            .await,
        Err(AgendaError::InvalidStatusTransition { .. })
    );
}

#[tokio::test]
async fn cancel_occurrence_records_an_exception_day() {
    let (service, ctx) = service();
    let mut request = create_request();
    request.recurrence = Some(RecurrenceRule::weekly());
    let created = service.create_appointment(&ctx, request).await.unwrap();

    let updated = service
        .cancel_occurrence(
            &ctx,
            OccurrenceId {
                base_id: created.id,
                occurrence_index: 1,
            },
        )
        .await
        .unwrap();

    let rule = updated.recurrence.unwrap();
    assert_eq!(rule.exceptions, vec![day(2025, 6, 17)]);

    // Canceling the same occurrence again does not duplicate the entry.
    let again = service
        .cancel_occurrence(
            &ctx,
            OccurrenceId {
                base_id: created.id,
                occurrence_index: 1,
            },
        )
        .await
        .unwrap();
    assert_eq!(again.recurrence.unwrap().exceptions.len(), 1);
}

#[tokio::test]
async fn cancel_occurrence_rejects_non_recurring_and_out_of_series() {
    let (service, ctx) = service();

    let plain = service
        .create_appointment(&ctx, create_request())
        .await
        .unwrap();
    assert_matches!(
        service
            .cancel_occurrence(
                &ctx,
                OccurrenceId {
                    base_id: plain.id,
                    occurrence_index: 0,
                },
            )
            .await,
        Err(AgendaError::ValidationError(_))
    );

    let mut bounded = create_request();
    bounded.recurrence = Some(RecurrenceRule {
        end: Some(RecurrenceEnd::Count(2)),
        ..RecurrenceRule::weekly()
    });
    let series = service.create_appointment(&ctx, bounded).await.unwrap();
    assert_matches!(
        service
            .cancel_occurrence(
                &ctx,
                OccurrenceId {
                    base_id: series.id,
                    occurrence_index: 5,
                },
            )
            .await,
        Err(AgendaError::ValidationError(_))
    );
}

#[tokio::test]
async fn delete_removes_the_document() {
    let (service, ctx) = service();
    let created = service
        .create_appointment(&ctx, create_request())
        .await
        .unwrap();

    service.delete_appointment(&ctx, created.id).await.unwrap();

    assert_matches!(
        service.get_appointment(&ctx, created.id).await,
        Err(AgendaError::NotFound)
    );
}
