use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use crate::api_state::ApiState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub backend_connected: bool,
    pub active_group: Option<String>,
    pub total_files: usize,
}

/// Always 200; `degraded` when the graph backend has no credential.
pub async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let backend_connected = state.graph_backend.is_configured();
    let snapshot = state.knowledge_base.snapshot();

    Json(HealthResponse {
        status: if backend_connected { "healthy" } else { "degraded" },
        backend_connected,
        total_files: snapshot.total_files(),
        active_group: snapshot.active_group,
    })
}
