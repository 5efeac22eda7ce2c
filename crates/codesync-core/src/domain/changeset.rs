//! Per-pass change accumulator
//!
//! A [`ChangeSet`] is created empty at the start of a sync pass, filled by
//! the tree walks and the upload stage, reconciled against the remote's
//! previous file list and finally turned into a
//! [`CompletionManifest`](super::manifest::CompletionManifest).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::manifest::CompletionManifest;

/// Status text recorded for uploads that never got a remote answer
pub const UPLOAD_FAILED_STATUS: &str = "Failed";

/// Result of pushing one file to the remote store
///
/// `status_code == 0` means the upload failed locally (stat, read, encode)
/// or at the transport level; any other code is the remote's own answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    pub file_path: String,
    pub status: String,
    pub status_code: u16,
}

impl UploadOutcome {
    pub fn new(file_path: impl Into<String>, status: impl Into<String>, status_code: u16) -> Self {
        Self {
            file_path: file_path.into(),
            status: status.into(),
            status_code,
        }
    }

    /// Outcome for a local or transport failure
    pub fn failed(file_path: impl Into<String>) -> Self {
        Self::new(file_path, UPLOAD_FAILED_STATUS, 0)
    }

    /// True when the remote never saw the request
    pub fn is_local_failure(&self) -> bool {
        self.status_code == 0
    }
}

/// Everything one sync pass has observed so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub file_list: Vec<String>,
    pub directory_list: Vec<String>,
    pub modified_list: Vec<String>,
    pub uploaded_files: Vec<UploadOutcome>,
    /// Index over `modified_list`
    modified_seen: HashSet<String>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_directory(&mut self, relative_path: impl Into<String>) {
        self.directory_list.push(relative_path.into());
    }

    pub fn record_file(&mut self, relative_path: impl Into<String>) {
        self.file_list.push(relative_path.into());
    }

    /// Marks a file as changed; duplicates are not added twice
    pub fn record_modified(&mut self, relative_path: impl Into<String>) {
        let relative_path = relative_path.into();
        if self.modified_seen.insert(relative_path.clone()) {
            self.modified_list.push(relative_path);
        }
    }

    pub fn record_outcomes(&mut self, outcomes: impl IntoIterator<Item = UploadOutcome>) {
        self.uploaded_files.extend(outcomes);
    }

    pub fn is_modified(&self, relative_path: &str) -> bool {
        self.modified_seen.contains(relative_path)
    }

    /// Files in this pass that the remote did not know about
    ///
    /// Order follows `file_list`.
    pub fn files_missing_from(&self, previous: &[String]) -> Vec<String> {
        let known: HashSet<&str> = previous.iter().map(String::as_str).collect();
        self.file_list
            .iter()
            .filter(|f| !known.contains(f.as_str()))
            .cloned()
            .collect()
    }

    /// Build the end-of-pass manifest stamped with the pass start time
    pub fn to_manifest(&self, pass_started_millis: i64) -> CompletionManifest {
        CompletionManifest {
            file_list: self.file_list.clone(),
            directory_list: self.directory_list.clone(),
            modified_list: self.modified_list.clone(),
            time_stamp: pass_started_millis,
        }
    }
}
