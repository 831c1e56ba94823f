//! Shared application state for all routes.

use crate::store::EntityStore;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct AppState {
    /// Opened once in `main` and closed after the server stops.
    pub store: Arc<dyn EntityStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        AppState { store }
    }
}
