// libs/shared/store/src/memory.rs
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_models::ClinicId;

use crate::{
    DataListener, Document, DocumentStore, ErrorListener, QueryFilter, StoreError,
    SubscriptionHandle,
};

struct ListenerEntry<T, F> {
    clinic: ClinicId,
    filter: Option<F>,
    on_data: DataListener<T>,
    on_error: Option<ErrorListener>,
}

/// In-process document store with push subscriptions. Documents are
/// partitioned per clinic; listeners registered for one clinic never see
/// another clinic's data. Result sets are ordered by (created_at, id) so
/// reads and pushes are deterministic.
pub struct InMemoryStore<T, F> {
    docs: RwLock<HashMap<ClinicId, HashMap<Uuid, T>>>,
    listeners: Arc<RwLock<HashMap<u64, ListenerEntry<T, F>>>>,
    next_listener_id: AtomicU64,
}

impl<T, F> InMemoryStore<T, F>
where
    T: Document,
    F: QueryFilter<T>,
{
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(HashMap::new()),
            listeners: Arc::new(RwLock::new(HashMap::new())),
            next_listener_id: AtomicU64::new(1),
        }
    }

    pub fn active_listener_count(&self) -> usize {
        self.listeners.read().expect("listener registry poisoned").len()
    }

    /// Drive the error channel of every subscription on a clinic. The
    /// in-process backend has no natural failure mode, so failure
    /// injection is how error-path behavior gets exercised.
    pub fn emit_error(&self, clinic: ClinicId, message: &str) {
        let listeners = self.listeners.read().expect("listener registry poisoned");
        for entry in listeners.values() {
            if entry.clinic != clinic {
                continue;
            }
            if let Some(on_error) = &entry.on_error {
                on_error(message.to_string());
            }
        }
    }

    fn snapshot(&self, clinic: ClinicId, filter: Option<&F>) -> Vec<T> {
        let docs = self.docs.read().expect("document map poisoned");
        let mut result: Vec<T> = docs
            .get(&clinic)
            .map(|clinic_docs| {
                clinic_docs
                    .values()
                    .filter(|doc| filter.map(|f| f.matches(doc)).unwrap_or(true))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        result.sort_by_key(|doc| (doc.created_at(), doc.id()));
        result
    }

    /// Push the full current matching result set to every listener on the
    /// mutated clinic.
    fn notify(&self, clinic: ClinicId) {
        let listeners = self.listeners.read().expect("listener registry poisoned");
        for (listener_id, entry) in listeners.iter() {
            if entry.clinic != clinic {
                continue;
            }
            let frame = self.snapshot(clinic, entry.filter.as_ref());
            debug!("Pushing {} documents to listener {}", frame.len(), listener_id);
            (entry.on_data)(frame);
        }
    }
}

impl<T, F> Default for InMemoryStore<T, F>
where
    T: Document,
    F: QueryFilter<T>,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T, F> DocumentStore<T, F> for InMemoryStore<T, F>
where
    T: Document,
    F: QueryFilter<T>,
{
    async fn get_by_id(&self, clinic: ClinicId, id: Uuid) -> Result<Option<T>, StoreError> {
        let docs = self.docs.read().expect("document map poisoned");
        Ok(docs.get(&clinic).and_then(|clinic_docs| clinic_docs.get(&id)).cloned())
    }

    async fn get_all(&self, clinic: ClinicId, filter: Option<F>) -> Result<Vec<T>, StoreError> {
        Ok(self.snapshot(clinic, filter.as_ref()))
    }

    async fn create(&self, clinic: ClinicId, doc: T) -> Result<T, StoreError> {
        {
            let mut docs = self.docs.write().expect("document map poisoned");
            let clinic_docs = docs.entry(clinic).or_default();
            if clinic_docs.contains_key(&doc.id()) {
                return Err(StoreError::AlreadyExists(doc.id()));
            }
            clinic_docs.insert(doc.id(), doc.clone());
        }
        self.notify(clinic);
        Ok(doc)
    }

    async fn update(&self, clinic: ClinicId, doc: T) -> Result<T, StoreError> {
        {
            let mut docs = self.docs.write().expect("document map poisoned");
            let clinic_docs = docs.entry(clinic).or_default();
            if !clinic_docs.contains_key(&doc.id()) {
                return Err(StoreError::NotFound);
            }
            clinic_docs.insert(doc.id(), doc.clone());
        }
        self.notify(clinic);
        Ok(doc)
    }

    async fn delete(&self, clinic: ClinicId, id: Uuid) -> Result<(), StoreError> {
        {
            let mut docs = self.docs.write().expect("document map poisoned");
            let removed = docs
                .get_mut(&clinic)
                .and_then(|clinic_docs| clinic_docs.remove(&id));
            if removed.is_none() {
                return Err(StoreError::NotFound);
            }
        }
        self.notify(clinic);
        Ok(())
    }

    async fn subscribe(
        &self,
        clinic: ClinicId,
        filter: Option<F>,
        on_data: DataListener<T>,
        on_error: Option<ErrorListener>,
    ) -> SubscriptionHandle {
        let listener_id = self.next_listener_id.fetch_add(1, Ordering::SeqCst);

        let initial = self.snapshot(clinic, filter.as_ref());

        {
            let mut listeners = self.listeners.write().expect("listener registry poisoned");
            listeners.insert(
                listener_id,
                ListenerEntry {
                    clinic,
                    filter,
                    on_data: Arc::clone(&on_data),
                    on_error,
                },
            );
        }
        debug!("Registered listener {} for clinic {}", listener_id, clinic);

        // First data frame: the current matching result set.
        on_data(initial);

        let listeners = Arc::clone(&self.listeners);
        SubscriptionHandle::new(move || {
            let mut listeners = match listeners.write() {
                Ok(listeners) => listeners,
                Err(poisoned) => {
                    warn!("Listener registry poisoned during teardown");
                    poisoned.into_inner()
                }
            };
            listeners.remove(&listener_id);
            debug!("Removed listener {}", listener_id);
        })
    }
}
