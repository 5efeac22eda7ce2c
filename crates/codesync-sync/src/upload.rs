//! Per-file upload stage
//!
//! Each modified file is read, zlib-compressed, base64-encoded and sent to
//! the remote in its own request. A failure is recorded as an
//! [`UploadOutcome::failed`] entry and never stops the remaining uploads.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use futures_util::stream::{self, StreamExt};
use tracing::{debug, warn};

use codesync_core::domain::changeset::UploadOutcome;
use codesync_core::domain::manifest::FileUploadMsg;
use codesync_core::domain::newtypes::ProjectId;
use codesync_core::ports::project_remote::IProjectRemote;

use crate::walker::PendingUpload;

/// Pushes changed files to the remote store
pub struct UploadCoordinator {
    remote: Arc<dyn IProjectRemote>,
    project_id: ProjectId,
    concurrency: usize,
}

impl UploadCoordinator {
    /// `concurrency` is clamped to at least one in-flight upload
    pub fn new(remote: Arc<dyn IProjectRemote>, project_id: ProjectId, concurrency: usize) -> Self {
        Self {
            remote,
            project_id,
            concurrency: concurrency.max(1),
        }
    }

    /// Uploads one file and reports the outcome
    #[tracing::instrument(skip(self, source), fields(project_id = %self.project_id))]
    pub async fn upload_file(&self, source: &Path, relative_path: &str) -> UploadOutcome {
        let message = match build_message(source, relative_path).await {
            Ok(message) => message,
            Err(err) => {
                warn!(path = relative_path, error = %err, "Could not prepare upload");
                return UploadOutcome::failed(relative_path);
            }
        };

        match self.remote.upload_file(&self.project_id, &message).await {
            Ok(status) => {
                if status.is_success() {
                    debug!(path = relative_path, status = %status.status, "Uploaded");
                } else {
                    warn!(path = relative_path, status = %status.status, "Remote rejected upload");
                }
                UploadOutcome::new(relative_path, status.status, status.status_code)
            }
            Err(err) => {
                warn!(path = relative_path, error = %err, "Upload failed");
                UploadOutcome::failed(relative_path)
            }
        }
    }

    /// Uploads every pending file, returning outcomes in input order
    pub async fn upload_all(&self, pending: Vec<PendingUpload>) -> Vec<UploadOutcome> {
        if pending.is_empty() {
            return Vec::new();
        }
        debug!(
            count = pending.len(),
            concurrency = self.concurrency,
            "Uploading modified files"
        );

        stream::iter(pending)
            .map(|item| async move {
                self.upload_file(&item.source, &item.relative_path).await
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}

async fn build_message(source: &Path, relative_path: &str) -> std::io::Result<FileUploadMsg> {
    let metadata = tokio::fs::metadata(source).await?;
    let content = tokio::fs::read(source).await?;

    Ok(FileUploadMsg {
        is_directory: metadata.is_dir(),
        mode: permission_bits(&metadata),
        relative_path: relative_path.to_string(),
        message: encode_content(&content)?,
    })
}

/// zlib-compresses then base64-encodes file content
pub fn encode_content(content: &[u8]) -> std::io::Result<String> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content)?;
    let compressed = encoder.finish()?;
    Ok(STANDARD.encode(compressed))
}

#[cfg(unix)]
fn permission_bits(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &std::fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}
