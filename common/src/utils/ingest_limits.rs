use super::config::AppConfig;
use crate::error::AppError;

/// Checks an upload batch before anything is staged: it must hold at least one
/// file and no more than `ingest_max_files`.
pub fn validate_ingest_batch(config: &AppConfig, file_count: usize) -> Result<(), AppError> {
    if file_count == 0 {
        return Err(AppError::Validation(
            "At least one file is required".to_string(),
        ));
    }

    if file_count > config.ingest_max_files {
        return Err(AppError::Validation(format!(
            "Too many files. Maximum allowed is {}",
            config.ingest_max_files
        )));
    }

    Ok(())
}
