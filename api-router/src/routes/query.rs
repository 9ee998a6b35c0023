use axum::{extract::State, response::IntoResponse, Json};
use axum_typed_multipart::{TryFromMultipart, TypedMultipart};

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, TryFromMultipart)]
pub struct QueryParams {
    #[form_data(default)]
    pub query: String,
    pub group_id: Option<String>,
}

pub async fn query_knowledge_base(
    State(state): State<ApiState>,
    TypedMultipart(input): TypedMultipart<QueryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .query_router
        .answer(&input.query, input.group_id.as_deref())
        .await?;

    Ok(Json(result))
}
