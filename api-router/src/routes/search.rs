use axum::{extract::State, response::IntoResponse, Json};
use axum_typed_multipart::{TryFromMultipart, TypedMultipart};
use retrieval_pipeline::parse_max_results;
use serde_json::json;

use crate::api_state::ApiState;

#[derive(Debug, TryFromMultipart)]
pub struct SearchParams {
    #[form_data(default)]
    pub query: String,
    pub max_results: Option<String>,
}

pub async fn web_search(
    State(state): State<ApiState>,
    TypedMultipart(input): TypedMultipart<SearchParams>,
) -> impl IntoResponse {
    let max_results = parse_max_results(input.max_results.as_deref());
    let results = state.search.search(&input.query, max_results).await;

    Json(json!({ "results": results }))
}
