//! Codesync Sync - Incremental project synchronization engine
//!
//! Provides:
//! - Lenient loading of the ignore and reference control files
//! - Glob-based ignore matching with directory pruning
//! - Lazy tree walks classifying entries by modification time
//! - Per-file compressed uploads that never abort the pass
//! - The pass orchestrator producing the completion manifest
//!
//! ## Modules
//!
//! - [`rules`] - RuleStore for `.cw-settings` and `.cw-refpaths.json`
//! - [`matcher`] - PathMatcher evaluating ignore rules
//! - [`walker`] - TreeWalker over the project tree and reference sources
//! - [`upload`] - UploadCoordinator packaging and pushing changed files
//! - [`engine`] - SyncEngine driving a full pass

pub mod engine;
pub mod matcher;
pub mod rules;
pub mod upload;
pub mod walker;

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can end (or, for `References`, qualify) a sync pass
///
/// Every variant maps to an operation tag through [`SyncError::op`] so
/// callers can report which phase failed.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote's project metadata could not be fetched
    #[error("failed to look up project {project_id}: {source:#}")]
    ProjectLookup {
        project_id: String,
        #[source]
        source: anyhow::Error,
    },

    /// The local path is missing and is not where the remote expects the project
    #[error("project path {path} does not exist and does not match the recorded location {recorded:?}")]
    PathMismatch { path: PathBuf, recorded: String },

    /// The local project directory has been removed; the remote was told
    #[error("project path {0} does not exist")]
    MissingProjectDir(PathBuf),

    /// Notifying the remote about the missing directory failed
    #[error("failed to report missing directory {path}: {source:#}")]
    Notify {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// A directory in the tree could not be read
    #[error("error walking the path {path}: {source}")]
    Traversal {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// One or more reference paths could not be resolved (non-fatal)
    #[error("{0}")]
    References(String),

    /// The completion manifest could not be delivered
    #[error("failed to complete upload for project {project_id}: {source:#}")]
    Complete {
        project_id: String,
        #[source]
        source: anyhow::Error,
    },

    /// A blocking walk task panicked or was cancelled
    #[error("background walk failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl SyncError {
    /// Stable tag naming the operation that failed
    pub fn op(&self) -> &'static str {
        match self {
            SyncError::ProjectLookup { .. } => "proj_lookup",
            SyncError::PathMismatch { .. } | SyncError::MissingProjectDir(_) => "proj_path",
            SyncError::Notify { .. } => "proj_notify",
            SyncError::Traversal { .. } => "proj_sync",
            SyncError::References(_) => "proj_sync_ref",
            SyncError::Complete { .. } => "proj_complete",
            SyncError::Task(_) => "proj_task",
        }
    }

    /// Whether the pass was aborted by this error
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SyncError::References(_))
    }
}
