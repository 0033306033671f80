//! Shared application state.

use stockwise_runtime::InsightService;

/// Shared application state accessible from all route handlers.
///
/// The service is read-only after startup, so handlers share it through an
/// `Arc` without locking.
pub struct AppState {
    pub service: InsightService,
}

impl AppState {
    pub fn new(service: InsightService) -> Self {
        Self { service }
    }
}
