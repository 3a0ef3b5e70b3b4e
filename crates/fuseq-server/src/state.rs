//! Application state shared across HTTP handlers.

use std::sync::Arc;
use std::time::Instant;

use crate::service::QueryService;

/// State cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// The wired query service.
    pub service: Arc<QueryService>,

    /// Server start time for uptime reporting.
    pub start_time: Instant,
}

impl AppState {
    /// Create state around a service.
    pub fn new(service: Arc<QueryService>) -> Self {
        Self {
            service,
            start_time: Instant::now(),
        }
    }

    /// Server uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
