// libs/shared/store/src/lib.rs
//
// Generic document-store contract consumed by every data cell: one-shot
// reads/writes plus a push subscription that delivers the full current
// matching result set on every change, until explicitly torn down.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use shared_models::ClinicId;

pub mod memory;

pub use memory::InMemoryStore;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Document not found")]
    NotFound,

    #[error("Document already exists: {0}")]
    AlreadyExists(Uuid),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// A stored entity. `created_at` gives the store a deterministic result
/// order without knowing anything about the domain.
pub trait Document: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;
}

/// Client-evaluable query shape. The store applies it both to one-shot
/// reads and to the result set pushed to subscribers.
pub trait QueryFilter<T>: Clone + Send + Sync + 'static {
    fn matches(&self, doc: &T) -> bool;
}

pub type DataListener<T> = Arc<dyn Fn(Vec<T>) + Send + Sync>;
pub type ErrorListener = Arc<dyn Fn(String) + Send + Sync>;

/// Teardown token for one live subscription. The teardown runs exactly
/// once: either through `unsubscribe` or when the handle is dropped.
pub struct SubscriptionHandle {
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionHandle {
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("active", &self.teardown.is_some())
            .finish()
    }
}

/// The consumed backend contract. Every operation is scoped by a clinic
/// id; documents of one clinic are never visible through another.
#[async_trait]
pub trait DocumentStore<T, F>: Send + Sync
where
    T: Document,
    F: QueryFilter<T>,
{
    async fn get_by_id(&self, clinic: ClinicId, id: Uuid) -> Result<Option<T>, StoreError>;

    async fn get_all(&self, clinic: ClinicId, filter: Option<F>) -> Result<Vec<T>, StoreError>;

    async fn create(&self, clinic: ClinicId, doc: T) -> Result<T, StoreError>;

    /// Full-document replace. Partial patching is the caller's concern.
    async fn update(&self, clinic: ClinicId, doc: T) -> Result<T, StoreError>;

    async fn delete(&self, clinic: ClinicId, id: Uuid) -> Result<(), StoreError>;

    /// Register interest in one clinic's documents. The listener receives
    /// the full current matching result set immediately and again after
    /// every mutation, until the returned handle is torn down. The error
    /// channel, if provided, receives backend failures; a subscription
    /// that has errored is not retried by the store.
    async fn subscribe(
        &self,
        clinic: ClinicId,
        filter: Option<F>,
        on_data: DataListener<T>,
        on_error: Option<ErrorListener>,
    ) -> SubscriptionHandle;
}
