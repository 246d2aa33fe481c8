//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use lantern_core::CounterStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CounterStore>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self {
            store,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
