// libs/live-query-cell/src/lib.rs
//
// The one reactive-query primitive behind every live list in the system
// (appointments, clinic tasks, memberships). Wraps a push subscription
// into `{ items, loading, error }` with a guarded lifecycle: at most one
// live subscription per instance, old interest torn down before new
// interest is registered, stale frames rejected.

pub mod query;

pub use query::{LiveQuery, QuerySnapshot};
