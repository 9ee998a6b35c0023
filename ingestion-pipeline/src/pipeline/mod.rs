mod config;

pub use config::IngestionConfig;

use std::sync::Arc;

use common::{
    error::AppError,
    storage::{
        knowledge_base::KnowledgeBaseStore,
        staging::{FileStaging, StagedBatch, UploadedFile},
        types::ingest_result::{IngestResult, IngestStatus},
    },
    utils::graph_backend::{GraphBackend, ProcessingOutcome},
};
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const NO_FILES_PROCESSED_MESSAGE: &str = "No files processed successfully";

/// Turns uploaded batches into a knowledge graph that covers every file
/// ingested so far.
#[allow(clippy::module_name_repetitions)]
pub struct IngestionPipeline {
    backend: Arc<dyn GraphBackend>,
    knowledge_base: Arc<dyn KnowledgeBaseStore>,
    staging: FileStaging,
    pipeline_config: IngestionConfig,
    // Held from appending file ids until the new group is committed, and by reset.
    writer: Mutex<()>,
}

impl IngestionPipeline {
    pub fn new(
        backend: Arc<dyn GraphBackend>,
        knowledge_base: Arc<dyn KnowledgeBaseStore>,
        staging: FileStaging,
        pipeline_config: IngestionConfig,
    ) -> Self {
        Self {
            backend,
            knowledge_base,
            staging,
            pipeline_config,
            writer: Mutex::new(()),
        }
    }

    pub fn knowledge_base(&self) -> &Arc<dyn KnowledgeBaseStore> {
        &self.knowledge_base
    }

    #[tracing::instrument(
        skip_all,
        fields(ingest_id = %Uuid::new_v4(), file_count = uploads.len())
    )]
    pub async fn ingest(&self, uploads: Vec<UploadedFile>) -> Result<IngestResult, AppError> {
        if uploads.is_empty() {
            return Err(AppError::Validation(
                "At least one file is required".to_string(),
            ));
        }

        let batch = self.staging.stage(uploads).await?;
        let outcome = self.process_batch(&batch).await;
        batch.cleanup();
        outcome
    }

    async fn process_batch(&self, batch: &StagedBatch) -> Result<IngestResult, AppError> {
        info!(files = batch.len(), "uploading batch to graph backend");
        let processed = self.backend.upload_and_process(batch.files()).await?;

        let mut new_ids = Vec::with_capacity(processed.len());
        for file in processed {
            match file.outcome {
                ProcessingOutcome::Success => new_ids.push(file.file_id),
                ProcessingOutcome::Failed { reason } => warn!(
                    file_id = %file.file_id,
                    file_name = %file.file_name,
                    reason = reason.as_deref().unwrap_or("unknown"),
                    "file failed processing"
                ),
            }
        }
        let failed = batch.len().saturating_sub(new_ids.len());

        if new_ids.is_empty() {
            warn!(failed, "no file in the batch processed successfully");
            return Ok(IngestResult {
                status: IngestStatus::Error,
                group_id: None,
                message: NO_FILES_PROCESSED_MESSAGE.to_string(),
                files_processed: 0,
                total_files: self.knowledge_base.total_files(),
            });
        }

        let _guard = self.writer.lock().await;

        self.knowledge_base.append_file_ids(&new_ids);
        let all_ids = self.knowledge_base.file_ids();
        let group_name = self.pipeline_config.group_name(all_ids.len());

        info!(
            new_files = new_ids.len(),
            total_files = all_ids.len(),
            %group_name,
            "rebuilding knowledge graph group"
        );

        let group_id = self
            .backend
            .create_group(&all_ids, &group_name)
            .await
            .map_err(|err| {
                error!(
                    error = %err,
                    appended = new_ids.len(),
                    "group creation failed; file ids kept, active group unchanged"
                );
                err
            })?;

        self.knowledge_base.set_group(group_id.clone());
        info!(%group_id, total_files = all_ids.len(), failed, "knowledge graph group active");

        Ok(IngestResult {
            status: IngestStatus::Success,
            group_id: Some(group_id),
            message: format!(
                "Knowledge Graph Built Successfully ({} of {} files processed)",
                new_ids.len(),
                batch.len()
            ),
            files_processed: new_ids.len(),
            total_files: all_ids.len(),
        })
    }

    /// Forgets every file id and the active group. Nothing is deleted on the
    /// backend.
    pub async fn reset(&self) {
        let _guard = self.writer.lock().await;
        self.knowledge_base.reset();
        info!("knowledge base cleared");
    }
}
