//! Remote store port (driven/secondary port)
//!
//! This is the only boundary between the sync core and the network. Every
//! request a sync pass makes goes through it: project metadata, the
//! previously recorded file list, the missing-directory signal, per-file
//! uploads and the completion manifest.
//!
//! ## Design Notes
//!
//! - Returns `anyhow::Result`; the engine decides per call whether a
//!   failure is fatal.
//! - A remote that answers with a non-2xx status to an upload or completion
//!   request is *not* an error: the status is returned in [`RemoteStatus`]
//!   and recorded verbatim. Only transport failures surface as `Err`.

use crate::domain::manifest::{CompletionManifest, FileUploadMsg, RemoteStatus};
use crate::domain::newtypes::ProjectId;
use crate::domain::project::ProjectInfo;

/// Port trait for the remote file store
#[async_trait::async_trait]
pub trait IProjectRemote: Send + Sync {
    /// Fetches the remote's metadata for a project
    async fn get_project(&self, project_id: &ProjectId) -> anyhow::Result<ProjectInfo>;

    /// Fetches the file list recorded by the previous completed pass
    async fn get_file_list(&self, project_id: &ProjectId) -> anyhow::Result<Vec<String>>;

    /// Tells the remote that the project's local directory has disappeared
    ///
    /// # Errors
    /// Fails on transport errors and on any non-200 answer.
    async fn notify_missing_local_dir(&self, project_id: &ProjectId) -> anyhow::Result<()>;

    /// Uploads one file
    async fn upload_file(
        &self,
        project_id: &ProjectId,
        message: &FileUploadMsg,
    ) -> anyhow::Result<RemoteStatus>;

    /// Submits the end-of-pass manifest
    async fn complete_upload(
        &self,
        project_id: &ProjectId,
        manifest: &CompletionManifest,
    ) -> anyhow::Result<RemoteStatus>;
}
