use std::path::{Path, PathBuf};

use bytes::Bytes;
use tempfile::{NamedTempFile, TempDir};
use tracing::{debug, warn};

use crate::{error::AppError, utils::config::AppConfig};

/// Bytes of one uploaded file, either buffered or already spooled to disk by
/// the multipart extractor.
#[derive(Debug)]
pub enum UploadContents {
    Bytes(Bytes),
    TempFile(NamedTempFile),
}

#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub contents: UploadContents,
}

impl UploadedFile {
    pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            contents: UploadContents::Bytes(bytes.into()),
        }
    }

    pub fn from_temp_file(file_name: impl Into<String>, file: NamedTempFile) -> Self {
        Self {
            file_name: file_name.into(),
            contents: UploadContents::TempFile(file),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub original_name: String,
    pub path: PathBuf,
}

/// A batch of staged files. The backing directory and everything in it is
/// removed when the batch is dropped.
#[derive(Debug)]
pub struct StagedBatch {
    dir: TempDir,
    files: Vec<StagedFile>,
}

impl StagedBatch {
    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Removes the staging directory, logging instead of failing.
    pub fn cleanup(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(err) = self.dir.close() {
            warn!(path = %path.display(), error = %err, "failed to remove staging directory");
        } else {
            debug!(path = %path.display(), "removed staging directory");
        }
    }
}

/// Writes uploads to a scratch directory so they can be handed to the graph
/// backend by path.
#[derive(Debug, Clone, Default)]
pub struct FileStaging {
    base_dir: Option<PathBuf>,
}

impl FileStaging {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.staging_dir.as_ref().map(PathBuf::from))
    }

    /// Stages every upload or none: on the first failure the partially filled
    /// directory is dropped and the error returned.
    pub async fn stage(&self, uploads: Vec<UploadedFile>) -> Result<StagedBatch, AppError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("graphon_");
        let dir = match &self.base_dir {
            Some(base) => {
                tokio::fs::create_dir_all(base).await.map_err(|e| {
                    AppError::Staging(format!(
                        "failed to create staging root {}: {e}",
                        base.display()
                    ))
                })?;
                builder.tempdir_in(base)
            }
            None => builder.tempdir(),
        }
        .map_err(|e| AppError::Staging(format!("failed to create staging directory: {e}")))?;

        let mut files = Vec::with_capacity(uploads.len());
        for (index, upload) in uploads.into_iter().enumerate() {
            let slot = dir.path().join(index.to_string());
            let path = slot.join(sanitize_file_name(&upload.file_name));

            write_upload(&slot, &path, upload.contents)
                .await
                .map_err(|e| {
                    AppError::Staging(format!("failed to stage {}: {e}", upload.file_name))
                })?;

            files.push(StagedFile {
                original_name: upload.file_name,
                path,
            });
        }

        debug!(
            path = %dir.path().display(),
            file_count = files.len(),
            "staged upload batch"
        );

        Ok(StagedBatch { dir, files })
    }
}

async fn write_upload(slot: &Path, path: &Path, contents: UploadContents) -> std::io::Result<()> {
    tokio::fs::create_dir_all(slot).await?;
    match contents {
        UploadContents::Bytes(bytes) => tokio::fs::write(path, &bytes).await,
        // Copy rather than persist: the spool file may live on another filesystem.
        UploadContents::TempFile(file) => tokio::fs::copy(file.path(), path).await.map(|_| ()),
    }
}

/// Replaces anything that is not ASCII alphanumeric or '_' in the stem with
/// '_', keeping the extension so the backend can detect the file type.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();

    let (stem, ext) = match base.rfind('.') {
        Some(idx) if idx > 0 => base.split_at(idx),
        _ => (base, ""),
    };

    let clean_ext: String = ext
        .chars()
        .filter(|c| *c == '.' || c.is_ascii_alphanumeric())
        .collect();
    let clean_stem: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if clean_stem.is_empty() {
        format!("upload{clean_ext}")
    } else {
        format!("{clean_stem}{clean_ext}")
    }
}
