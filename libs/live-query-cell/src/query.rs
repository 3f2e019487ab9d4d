// libs/live-query-cell/src/query.rs
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use shared_models::ClinicId;
use shared_store::{
    DataListener, Document, DocumentStore, ErrorListener, QueryFilter, SubscriptionHandle,
};
use tenant_cell::Scoped;

/// Point-in-time view of a live query.
#[derive(Debug, Clone)]
pub struct QuerySnapshot<T> {
    pub items: Vec<T>,
    /// True from subscribe until the first data frame of the *current*
    /// subscription arrives.
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for QuerySnapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

/// Live collection manager. Holds at most one active subscription; every
/// scope or filter change tears the previous one down first, and frames
/// arriving late from a superseded subscription never touch state.
pub struct LiveQuery<T, F> {
    store: Arc<dyn DocumentStore<T, F>>,
    state: Arc<Mutex<QuerySnapshot<T>>>,
    /// Incremented on every (re)subscribe. Callbacks capture the value
    /// current at subscribe time; a mismatch marks the frame stale.
    epoch: Arc<AtomicU64>,
    active: Mutex<Option<SubscriptionHandle>>,
    last_target: Mutex<Option<(ClinicId, Option<F>)>>,
}

impl<T, F> LiveQuery<T, F>
where
    T: Document,
    F: QueryFilter<T>,
{
    pub fn new(store: Arc<dyn DocumentStore<T, F>>) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(QuerySnapshot::default())),
            epoch: Arc::new(AtomicU64::new(0)),
            active: Mutex::new(None),
            last_target: Mutex::new(None),
        }
    }

    /// Point the query at a clinic and filter shape. Changing either value
    /// is a full resubscribe, not an additive query. An unscoped tenant
    /// clears the query without issuing anything to the store.
    pub async fn set_scope(&self, scope: Scoped<ClinicId>, filter: Option<F>) {
        // Tear down the previous interest before registering any new
        // callback. Exactly one subscription may be live at a time.
        let previous = self.active.lock().expect("live query state poisoned").take();
        if let Some(handle) = previous {
            handle.unsubscribe();
        }

        let my_epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let clinic = match scope {
            Scoped::Ready(clinic) => clinic,
            Scoped::Unscoped => {
                debug!("Live query unscoped; clearing without subscribing");
                *self.state.lock().expect("live query state poisoned") =
                    QuerySnapshot::default();
                *self.last_target.lock().expect("live query state poisoned") = None;
                return;
            }
        };

        {
            let mut state = self.state.lock().expect("live query state poisoned");
            state.items = Vec::new();
            state.loading = true;
            state.error = None;
        }

        let data_state = Arc::clone(&self.state);
        let data_epoch = Arc::clone(&self.epoch);
        let on_data: DataListener<T> = Arc::new(move |frame| {
            if data_epoch.load(Ordering::SeqCst) != my_epoch {
                debug!("Dropping stale data frame from superseded subscription");
                return;
            }
            let mut state = data_state.lock().expect("live query state poisoned");
            state.items = frame;
            state.loading = false;
            state.error = None;
        });

        let error_state = Arc::clone(&self.state);
        let error_epoch = Arc::clone(&self.epoch);
        let on_error: ErrorListener = Arc::new(move |message| {
            if error_epoch.load(Ordering::SeqCst) != my_epoch {
                debug!("Dropping stale error from superseded subscription");
                return;
            }
            let mut state = error_state.lock().expect("live query state poisoned");
            state.error = Some(message);
            state.loading = false;
        });

        let handle = self
            .store
            .subscribe(clinic, filter.clone(), on_data, Some(on_error))
            .await;

        *self.active.lock().expect("live query state poisoned") = Some(handle);
        *self.last_target.lock().expect("live query state poisoned") = Some((clinic, filter));
    }

    /// Caller-invoked resubscribe. Errors are never auto-retried; this is
    /// the explicit recovery path.
    pub async fn refresh(&self) {
        let target = self.last_target.lock().expect("live query state poisoned").clone();
        match target {
            Some((clinic, filter)) => self.set_scope(Scoped::Ready(clinic), filter).await,
            None => self.set_scope(Scoped::Unscoped, None).await,
        }
    }

    pub fn snapshot(&self) -> QuerySnapshot<T> {
        self.state.lock().expect("live query state poisoned").clone()
    }

    /// Drop interest without consuming the query. Any frame still in
    /// flight from the old subscription is rejected by the epoch guard.
    pub fn detach(&self) {
        let previous = self.active.lock().expect("live query state poisoned").take();
        if let Some(handle) = previous {
            handle.unsubscribe();
        }
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *self.last_target.lock().expect("live query state poisoned") = None;
    }
}
