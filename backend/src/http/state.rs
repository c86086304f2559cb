//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::services::ValueGate;
use crate::time::TimestampNormalizer;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Record store
    pub repository: Arc<dyn FullRepository>,
    /// Civil timezone conversion, fixed at startup
    pub normalizer: TimestampNormalizer,
    /// Input gate bound to the same timezone
    pub gate: ValueGate,
}

impl AppState {
    pub fn new(repository: Arc<dyn FullRepository>, normalizer: TimestampNormalizer) -> Self {
        let gate = ValueGate::new(normalizer.clone());
        Self {
            repository,
            normalizer,
            gate,
        }
    }
}
