//! Wire types exchanged with the remote store
//!
//! Field names follow the remote's JSON API (`camelCase`, plus the
//! historical `timeStamp`, `path` and `msg` keys).

use serde::{Deserialize, Serialize};

use super::changeset::UploadOutcome;

/// End-of-pass summary sent once per sync pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionManifest {
    pub file_list: Vec<String>,
    pub directory_list: Vec<String>,
    pub modified_list: Vec<String>,
    /// Wall-clock ms at pass start; becomes the next pass's cutoff
    #[serde(rename = "timeStamp")]
    pub time_stamp: i64,
}

/// Body of a single-file upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUploadMsg {
    #[serde(rename = "isDirectory")]
    pub is_directory: bool,
    /// POSIX permission bits
    pub mode: u32,
    /// Forward-slash path relative to the project root
    #[serde(rename = "path")]
    pub relative_path: String,
    /// zlib-compressed, base64-encoded file content
    #[serde(rename = "msg")]
    pub message: String,
}

/// Status line returned by the remote for a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteStatus {
    /// Status text, e.g. `"200 OK"`
    pub status: String,
    pub status_code: u16,
}

impl RemoteStatus {
    pub fn new(status: impl Into<String>, status_code: u16) -> Self {
        Self {
            status: status.into(),
            status_code,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Result of a sync pass as reported to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    /// Status text of the completion call
    pub status: String,
    /// Status code of the completion call
    pub status_code: u16,
    pub uploaded_files: Vec<UploadOutcome>,
}
