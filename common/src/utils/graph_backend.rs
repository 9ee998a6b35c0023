use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::{
    multipart::{Form, Part},
    Response,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

use crate::{error::AppError, storage::staging::StagedFile, utils::config::AppConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingOutcome {
    Success,
    Failed { reason: Option<String> },
}

/// Terminal processing state of one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedFile {
    pub file_id: String,
    pub file_name: String,
    pub outcome: ProcessingOutcome,
}

impl ProcessedFile {
    pub fn succeeded(&self) -> bool {
        self.outcome == ProcessingOutcome::Success
    }
}

/// Answer from the backend with its source records left undecoded; their
/// shape is not under our control.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GraphAnswer {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<serde_json::Value>,
}

/// The external knowledge-graph service. Every call blocks until the backend
/// reports a terminal state.
#[async_trait]
pub trait GraphBackend: Send + Sync {
    /// Whether the backend has what it needs to serve calls.
    fn is_configured(&self) -> bool {
        true
    }

    /// Uploads the files and waits until each one is processed. Results are in
    /// input order; a file that fails processing is reported, not raised.
    async fn upload_and_process(&self, files: &[StagedFile])
        -> Result<Vec<ProcessedFile>, AppError>;

    /// Builds a group from exactly `file_ids` and returns its id once ready.
    async fn create_group(&self, file_ids: &[String], group_name: &str)
        -> Result<String, AppError>;

    async fn query_group(&self, group_id: &str, query: &str) -> Result<GraphAnswer, AppError>;
}

/// Stand-in used when the credential is missing: the server still runs, but
/// every graph call fails with a configuration error.
#[derive(Debug, Clone)]
pub struct UnconfiguredGraphBackend {
    reason: String,
}

impl UnconfiguredGraphBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> AppError {
        AppError::Configuration(self.reason.clone())
    }
}

#[async_trait]
impl GraphBackend for UnconfiguredGraphBackend {
    fn is_configured(&self) -> bool {
        false
    }

    async fn upload_and_process(
        &self,
        _files: &[StagedFile],
    ) -> Result<Vec<ProcessedFile>, AppError> {
        Err(self.error())
    }

    async fn create_group(
        &self,
        _file_ids: &[String],
        _group_name: &str,
    ) -> Result<String, AppError> {
        Err(self.error())
    }

    async fn query_group(&self, _group_id: &str, _query: &str) -> Result<GraphAnswer, AppError> {
        Err(self.error())
    }
}

/// Builds the Graphon client once at startup. A missing credential is logged
/// and yields an [`UnconfiguredGraphBackend`] instead of aborting the process.
pub fn graph_backend_from_config(config: &AppConfig) -> Arc<dyn GraphBackend> {
    match GraphonClient::from_config(config) {
        Ok(client) => {
            info!(base_url = %config.graphon_base_url, "Graphon client initialized");
            Arc::new(client)
        }
        Err(err) => {
            warn!(error = %err, "Graphon client unavailable; graph calls will fail");
            Arc::new(UnconfiguredGraphBackend::new(err.to_string()))
        }
    }
}

#[derive(Debug, Deserialize)]
struct FileStatusResponse {
    file_id: String,
    #[serde(default)]
    processing_status: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateGroupRequest<'a> {
    file_ids: &'a [String],
    group_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct GroupStatusResponse {
    group_id: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct QueryGroupRequest<'a> {
    query: &'a str,
    return_source_data: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    Pending,
    Succeeded,
    Failed,
}

fn file_progress(status: &str) -> Progress {
    match status.to_ascii_uppercase().as_str() {
        "SUCCESS" | "SUCCEEDED" | "COMPLETED" => Progress::Succeeded,
        "FAILURE" | "FAILED" | "ERROR" => Progress::Failed,
        _ => Progress::Pending,
    }
}

fn group_progress(status: &str) -> Progress {
    match status.to_ascii_uppercase().as_str() {
        "READY" | "SUCCESS" | "COMPLETED" => Progress::Succeeded,
        "FAILURE" | "FAILED" | "ERROR" => Progress::Failed,
        _ => Progress::Pending,
    }
}

/// HTTP client for the Graphon knowledge-graph API.
#[derive(Debug, Clone)]
pub struct GraphonClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    poll_interval: Duration,
}

impl GraphonClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        poll_interval: Duration,
        request_timeout: Duration,
    ) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            AppError::Configuration(format!("invalid Graphon base url '{base_url}': {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Configuration(format!(
                "Graphon base url '{base_url}' cannot carry a path"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
            poll_interval,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let api_key = config.graphon_api_key().ok_or_else(|| {
            AppError::Configuration("GRAPHON_API_KEY is not set".to_string())
        })?;

        Self::new(
            &config.graphon_base_url,
            api_key,
            Duration::from_millis(config.graphon_poll_interval_ms),
            Duration::from_secs(config.graphon_request_timeout_secs),
        )
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AppError::Configuration("Graphon base url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_json<T: DeserializeOwned>(response: Response, action: &str) -> Result<T, AppError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Backend(format!(
                "{action} failed with status {status}: {}",
                body.trim()
            )));
        }

        response.json::<T>().await.map_err(|e| {
            AppError::Backend(format!("{action} returned an unreadable response: {e}"))
        })
    }

    async fn upload_file(&self, file: &StagedFile) -> Result<FileStatusResponse, AppError> {
        let bytes = tokio::fs::read(&file.path).await?;
        let mime = mime_guess::from_path(&file.path).first_or_octet_stream();
        let part = Part::bytes(bytes)
            .file_name(file.original_name.clone())
            .mime_str(mime.essence_str())?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(self.endpoint(&["files"])?)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("upload of {} failed: {e}", file.original_name)))?;

        Self::read_json(response, "file upload").await
    }

    async fn wait_for_file(&self, mut status: FileStatusResponse) -> Result<FileStatusResponse, AppError> {
        loop {
            if file_progress(&status.processing_status) != Progress::Pending {
                return Ok(status);
            }
            debug!(
                file_id = %status.file_id,
                processing_status = %status.processing_status,
                "waiting for file processing"
            );
            sleep(self.poll_interval).await;

            let response = self
                .http
                .get(self.endpoint(&["files", status.file_id.as_str()])?)
                .bearer_auth(&self.api_key)
                .send()
                .await
                .map_err(|e| AppError::Backend(format!("file status request failed: {e}")))?;
            status = Self::read_json(response, "file status").await?;
        }
    }

    async fn process_one(&self, file: &StagedFile) -> Result<ProcessedFile, AppError> {
        let uploaded = self.upload_file(file).await?;
        let finished = self.wait_for_file(uploaded).await?;

        let outcome = match file_progress(&finished.processing_status) {
            Progress::Succeeded => ProcessingOutcome::Success,
            _ => ProcessingOutcome::Failed {
                reason: finished.error,
            },
        };

        Ok(ProcessedFile {
            file_id: finished.file_id,
            file_name: file.original_name.clone(),
            outcome,
        })
    }
}

#[async_trait]
impl GraphBackend for GraphonClient {
    async fn upload_and_process(
        &self,
        files: &[StagedFile],
    ) -> Result<Vec<ProcessedFile>, AppError> {
        try_join_all(files.iter().map(|file| self.process_one(file))).await
    }

    async fn create_group(
        &self,
        file_ids: &[String],
        group_name: &str,
    ) -> Result<String, AppError> {
        let response = self
            .http
            .post(self.endpoint(&["groups"])?)
            .bearer_auth(&self.api_key)
            .json(&CreateGroupRequest {
                file_ids,
                group_name,
            })
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("group creation request failed: {e}")))?;
        let mut status: GroupStatusResponse = Self::read_json(response, "group creation").await?;

        loop {
            match group_progress(&status.status) {
                Progress::Succeeded => return Ok(status.group_id),
                Progress::Failed => {
                    return Err(AppError::Backend(format!(
                        "group {} failed to build: {}",
                        status.group_id,
                        status.error.as_deref().unwrap_or("no reason given")
                    )))
                }
                Progress::Pending => {}
            }
            debug!(group_id = %status.group_id, status = %status.status, "waiting for group");
            sleep(self.poll_interval).await;

            let response = self
                .http
                .get(self.endpoint(&["groups", status.group_id.as_str()])?)
                .bearer_auth(&self.api_key)
                .send()
                .await
                .map_err(|e| AppError::Backend(format!("group status request failed: {e}")))?;
            status = Self::read_json(response, "group status").await?;
        }
    }

    async fn query_group(&self, group_id: &str, query: &str) -> Result<GraphAnswer, AppError> {
        let response = self
            .http
            .post(self.endpoint(&["groups", group_id, "query"])?)
            .bearer_auth(&self.api_key)
            .json(&QueryGroupRequest {
                query,
                return_source_data: true,
            })
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("query request failed: {e}")))?;

        Self::read_json(response, "group query").await
    }
}
