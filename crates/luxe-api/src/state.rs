//! Application state shared across all route handlers.

use std::sync::Arc;

use luxe_chat::ChatOrchestrator;
use luxe_core::types::HealthStatus;

/// Shared application state, passed to handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Per-message pipeline: greeting, retrieval, prompt, generation.
    pub orchestrator: Arc<ChatOrchestrator>,
    /// Readiness flags captured at startup. Never mutated.
    pub health: HealthStatus,
}

impl AppState {
    pub fn new(orchestrator: ChatOrchestrator, health: HealthStatus) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            health,
        }
    }
}
