//! HttpProjectRemote - IProjectRemote implementation over HTTP
//!
//! Wraps the [`RemoteClient`] and adds request context to every error so the
//! sync engine can report which call failed.
//!
//! ## Design Notes
//!
//! - Upload and completion answers are passed through as [`RemoteStatus`]
//!   whatever their code; only transport failures become errors.
//! - The missing-directory signal fails on any answer other than 200.

use anyhow::{Context, Result};

use codesync_core::config::RemoteConfig;
use codesync_core::domain::manifest::{CompletionManifest, FileUploadMsg, RemoteStatus};
use codesync_core::domain::newtypes::ProjectId;
use codesync_core::domain::project::ProjectInfo;
use codesync_core::ports::project_remote::IProjectRemote;

use crate::client::RemoteClient;
use crate::RemoteError;

/// Remote project store reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpProjectRemote {
    client: RemoteClient,
}

impl HttpProjectRemote {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }

    /// Builds the adapter from the `remote` configuration section
    pub fn from_config(config: &RemoteConfig) -> Result<Self, RemoteError> {
        Ok(Self::new(RemoteClient::new(config)?))
    }

    pub fn client(&self) -> &RemoteClient {
        &self.client
    }
}

#[async_trait::async_trait]
impl IProjectRemote for HttpProjectRemote {
    async fn get_project(&self, project_id: &ProjectId) -> Result<ProjectInfo> {
        self.client
            .get_project(project_id)
            .await
            .with_context(|| format!("Failed to fetch project {project_id}"))
    }

    async fn get_file_list(&self, project_id: &ProjectId) -> Result<Vec<String>> {
        self.client
            .get_file_list(project_id)
            .await
            .with_context(|| format!("Failed to fetch file list of project {project_id}"))
    }

    async fn notify_missing_local_dir(&self, project_id: &ProjectId) -> Result<()> {
        self.client
            .notify_missing_local_dir(project_id)
            .await
            .with_context(|| format!("Failed to report missing directory of project {project_id}"))
    }

    async fn upload_file(&self, project_id: &ProjectId, message: &FileUploadMsg) -> Result<RemoteStatus> {
        self.client
            .upload_file(project_id, message)
            .await
            .with_context(|| format!("Failed to upload {}", message.relative_path))
    }

    async fn complete_upload(
        &self,
        project_id: &ProjectId,
        manifest: &CompletionManifest,
    ) -> Result<RemoteStatus> {
        self.client
            .complete_upload(project_id, manifest)
            .await
            .with_context(|| format!("Failed to complete upload for project {project_id}"))
    }
}
