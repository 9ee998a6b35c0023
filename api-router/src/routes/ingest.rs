use axum::{extract::State, response::IntoResponse, Json};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use common::{storage::staging::UploadedFile, utils::ingest_limits::validate_ingest_batch};
use tempfile::NamedTempFile;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, TryFromMultipart)]
pub struct IngestParams {
    // Overall size is bounded by the router's DefaultBodyLimit.
    #[form_data(limit = "unlimited")]
    #[form_data(default)]
    pub files: Vec<FieldData<NamedTempFile>>,
}

pub async fn ingest_files(
    State(state): State<ApiState>,
    TypedMultipart(input): TypedMultipart<IngestParams>,
) -> Result<impl IntoResponse, ApiError> {
    let file_count = input.files.len();
    info!(file_count, "Received ingestion request");

    validate_ingest_batch(&state.config, file_count)?;

    let uploads = input
        .files
        .into_iter()
        .enumerate()
        .map(|(index, file)| {
            let file_name = file
                .metadata
                .file_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| format!("upload_{index}"));
            UploadedFile::from_temp_file(file_name, file.contents)
        })
        .collect();

    let result = state.ingestion.ingest(uploads).await?;

    Ok(Json(result))
}
