use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Success,
    Error,
}

/// Outcome of one ingestion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestResult {
    pub status: IngestStatus,
    pub group_id: Option<String>,
    pub message: String,
    /// Files that succeeded in this call.
    pub files_processed: usize,
    /// Files in the knowledge base after this call.
    pub total_files: usize,
}

impl IngestResult {
    pub fn is_success(&self) -> bool {
        self.status == IngestStatus::Success
    }
}
