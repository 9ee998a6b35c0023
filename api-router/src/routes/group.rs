use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::api_state::ApiState;

pub async fn get_group(State(state): State<ApiState>) -> impl IntoResponse {
    Json(json!({ "group_id": state.knowledge_base.active_group() }))
}

pub async fn clear_group(State(state): State<ApiState>) -> impl IntoResponse {
    state.ingestion.reset().await;

    Json(json!({
        "status": "cleared",
        "message": "Knowledge Graph disconnected"
    }))
}
