//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the process is serving.
    pub status: String,
    /// Live connection count.
    pub connections: usize,
    /// Online identity count.
    pub online_users: usize,
    /// Active two-party calls.
    pub active_calls: usize,
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        connections: state.engine.pool.count(),
        online_users: state.engine.presence.online_count(),
        active_calls: state.engine.calls.active_count(),
    })
}
