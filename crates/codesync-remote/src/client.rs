//! Remote project API client
//!
//! Typed wrapper over `reqwest` for the five project endpoints a sync pass
//! uses. All paths live under `/api/v1/projects/{id}`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use codesync_remote::client::RemoteClient;
//! use codesync_core::domain::ProjectId;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = RemoteClient::with_base_url("http://localhost:9090")?;
//! let id: ProjectId = "b1a78500".parse()?;
//! let files = client.get_file_list(&id).await?;
//! println!("{} files recorded", files.len());
//! # Ok(())
//! # }
//! ```

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use codesync_core::config::RemoteConfig;
use codesync_core::domain::manifest::{CompletionManifest, FileUploadMsg, RemoteStatus};
use codesync_core::domain::newtypes::ProjectId;
use codesync_core::domain::project::ProjectInfo;

use crate::{status_text, RemoteError};

/// HTTP client for the remote project API
#[derive(Debug, Clone)]
pub struct RemoteClient {
    client: Client,
    /// Base URL without a trailing slash
    base_url: String,
    /// Bearer token sent with every request when present
    access_token: Option<String>,
}

impl RemoteClient {
    /// Creates a client from the `remote` configuration section
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = Self::with_base_url(&config.url)?;
        Ok(match &config.access_token {
            Some(token) => client.with_access_token(token.clone()),
            None => client,
        })
    }

    /// Creates an unauthenticated client for `base_url` (useful for testing)
    pub fn with_base_url(base_url: impl AsRef<str>) -> Result<Self, RemoteError> {
        let parsed = Url::parse(base_url.as_ref())?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RemoteError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        Ok(Self {
            client: Client::new(),
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            access_token: None,
        })
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates a request builder for a path relative to the base URL
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// `GET /api/v1/projects/{id}`
    pub async fn get_project(&self, project_id: &ProjectId) -> Result<ProjectInfo, RemoteError> {
        let endpoint = project_path(project_id, "");
        debug!(%endpoint, "Fetching project metadata");

        let response = self.request(Method::GET, &endpoint).send().await?;
        parse_json(expect_success(response, &endpoint)?, &endpoint).await
    }

    /// `GET /api/v1/projects/{id}/fileList`
    pub async fn get_file_list(&self, project_id: &ProjectId) -> Result<Vec<String>, RemoteError> {
        let endpoint = project_path(project_id, "/fileList");
        debug!(%endpoint, "Fetching recorded file list");

        let response = self.request(Method::GET, &endpoint).send().await?;
        parse_json(expect_success(response, &endpoint)?, &endpoint).await
    }

    /// `POST /api/v1/projects/{id}/missingLocalDir`; anything but 200 fails
    pub async fn notify_missing_local_dir(&self, project_id: &ProjectId) -> Result<(), RemoteError> {
        let endpoint = project_path(project_id, "/missingLocalDir");
        debug!(%endpoint, "Reporting missing local directory");

        let response = self.request(Method::POST, &endpoint).send().await?;
        if response.status() != StatusCode::OK {
            return Err(RemoteError::from_status(response.status(), &endpoint));
        }
        Ok(())
    }

    /// `PUT /api/v1/projects/{id}/upload`
    ///
    /// Any status the remote answers with is returned, not raised.
    pub async fn upload_file(
        &self,
        project_id: &ProjectId,
        message: &FileUploadMsg,
    ) -> Result<RemoteStatus, RemoteError> {
        let endpoint = project_path(project_id, "/upload");
        let response = self
            .request(Method::PUT, &endpoint)
            .json(message)
            .send()
            .await?;
        Ok(remote_status(&response))
    }

    /// `POST /api/v1/projects/{id}/upload/end`
    pub async fn complete_upload(
        &self,
        project_id: &ProjectId,
        manifest: &CompletionManifest,
    ) -> Result<RemoteStatus, RemoteError> {
        let endpoint = project_path(project_id, "/upload/end");
        debug!(
            %endpoint,
            files = manifest.file_list.len(),
            modified = manifest.modified_list.len(),
            "Submitting completion manifest"
        );

        let response = self
            .request(Method::POST, &endpoint)
            .json(manifest)
            .send()
            .await?;
        Ok(remote_status(&response))
    }
}

fn project_path(project_id: &ProjectId, suffix: &str) -> String {
    format!("/api/v1/projects/{project_id}{suffix}")
}

fn remote_status(response: &Response) -> RemoteStatus {
    RemoteStatus::new(status_text(response.status()), response.status().as_u16())
}

fn expect_success(response: Response, endpoint: &str) -> Result<Response, RemoteError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(RemoteError::from_status(response.status(), endpoint))
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response, endpoint: &str) -> Result<T, RemoteError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|err| RemoteError::InvalidResponse {
        endpoint: endpoint.to_string(),
        message: err.to_string(),
    })
}
