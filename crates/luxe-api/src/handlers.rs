//! Route handler functions.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use luxe_core::types::{ChatResponse, HealthStatus};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /chat.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// POST /chat - handle one customer message.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        warn!(error = %e, "Rejected malformed chat request");
        ApiError::Internal(e.body_text())
    })?;

    let response = state
        .orchestrator
        .handle_message(req.user_id.as_deref(), &req.message)
        .await?;

    Ok(Json(response))
}

/// GET /health - readiness flags captured at startup.
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(state.health)
}
