//! Shared application state for the HTTP handlers.
//!
//! [`AppState`] carries the bound [`Datastore`] adapter. Handlers receive
//! it through Axum's `State` extractor; there is no ambient lookup.

use std::sync::Arc;

use highscore_store::{Datastore, Simulator};

/// State shared by every request.
#[derive(Clone)]
pub struct AppState {
    /// The storage adapter serving this process.
    pub store: Arc<dyn Datastore>,
}

impl AppState {
    /// Bind `store` as the adapter for all handlers.
    pub const fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }

    /// State backed by a fresh, empty in-memory simulator.
    pub fn simulator() -> Self {
        Self::new(Arc::new(Simulator::new()))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
