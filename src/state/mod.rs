//! Persisted counter state
//!
//! Best-effort JSON persistence of the ads counter.

mod store;

pub use store::{PersistedState, StateError, StateStore};
