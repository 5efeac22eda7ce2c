//! Tree traversal
//!
//! [`TreeWalker`] is a lazy iterator over the entries of one walk: either the
//! physical project tree or a single reference source. It only classifies
//! entries. Uploading the modified ones is a separate stage, fed by the
//! [`PendingUpload`] list that [`TreeWalker::collect_into`] builds.

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, trace};
use walkdir::WalkDir;

use codesync_core::domain::changeset::ChangeSet;

use crate::matcher::PathMatcher;
use crate::SyncError;

/// Where a walk starts and how its entries map to project-relative paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkScope {
    /// The project directory; the root itself is not reported
    Project { root: PathBuf },
    /// A reference source; the source maps to `target`, descendants below it
    Reference { source: PathBuf, target: String },
}

impl WalkScope {
    pub fn project(root: impl Into<PathBuf>) -> Self {
        WalkScope::Project { root: root.into() }
    }

    pub fn reference(source: impl Into<PathBuf>, target: impl Into<String>) -> Self {
        WalkScope::Reference {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn root(&self) -> &Path {
        match self {
            WalkScope::Project { root } => root,
            WalkScope::Reference { source, .. } => source,
        }
    }

    fn min_depth(&self) -> usize {
        match self {
            WalkScope::Project { .. } => 1,
            WalkScope::Reference { .. } => 0,
        }
    }

    /// Forward-slash path of `path` relative to the project
    fn relative_path(&self, path: &Path) -> Option<String> {
        let below_root = path.strip_prefix(self.root()).ok()?;
        let below_root = to_slash(below_root);
        match self {
            WalkScope::Project { .. } => Some(below_root),
            WalkScope::Reference { target, .. } if below_root.is_empty() => Some(target.clone()),
            WalkScope::Reference { target, .. } => Some(format!("{target}/{below_root}")),
        }
    }
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Classification of a visited entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    /// A file not modified since the cutoff
    File,
    /// A file whose mtime is later than the cutoff
    ModifiedFile,
}

/// One filesystem node visited during a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// OS-native path the content is read from
    pub path: PathBuf,
    /// Forward-slash path relative to the project root
    pub relative_path: String,
    pub kind: EntryKind,
    /// Milliseconds since the epoch
    pub modified_millis: i64,
}

/// A modified file waiting for the upload stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub source: PathBuf,
    pub relative_path: String,
}

impl PendingUpload {
    pub fn new(source: impl Into<PathBuf>, relative_path: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            relative_path: relative_path.into(),
        }
    }
}

/// Counts gathered while draining a walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub directories: usize,
    pub files: usize,
    pub modified: usize,
    /// The watched control file was among the modified files
    pub ref_paths_changed: bool,
}

/// Lazy walk over one scope
///
/// Entries come in file-name order. Ignored directories are pruned, ignored
/// files are skipped. The first traversal error is returned as
/// [`SyncError::Traversal`]; callers treat it as fatal.
pub struct TreeWalker<'m> {
    scope: WalkScope,
    matcher: &'m PathMatcher,
    cutoff_millis: i64,
    watched_file: Option<String>,
    inner: walkdir::IntoIter,
}

impl<'m> TreeWalker<'m> {
    pub fn new(scope: WalkScope, matcher: &'m PathMatcher, cutoff_millis: i64) -> Self {
        let inner = WalkDir::new(scope.root())
            .min_depth(scope.min_depth())
            .sort_by_file_name()
            .into_iter();

        Self {
            scope,
            matcher,
            cutoff_millis,
            watched_file: None,
            inner,
        }
    }

    /// Flags [`WalkSummary::ref_paths_changed`] when this relative path is modified
    pub fn watching(mut self, relative_path: impl Into<String>) -> Self {
        self.watched_file = Some(relative_path.into());
        self
    }

    /// Drains the walk into the change set
    ///
    /// Directories and files are appended to their lists; modified files are
    /// also added to the modified list and queued for upload.
    pub fn collect_into(
        self,
        changes: &mut ChangeSet,
        pending: &mut Vec<PendingUpload>,
    ) -> Result<WalkSummary, SyncError> {
        let watched_file = self.watched_file.clone();
        let root = self.scope.root().to_path_buf();
        let mut summary = WalkSummary::default();

        for entry in self {
            let entry = entry?;
            match entry.kind {
                EntryKind::Directory => {
                    summary.directories += 1;
                    changes.record_directory(entry.relative_path);
                }
                EntryKind::File => {
                    summary.files += 1;
                    changes.record_file(entry.relative_path);
                }
                EntryKind::ModifiedFile => {
                    summary.files += 1;
                    summary.modified += 1;
                    if watched_file.as_deref() == Some(entry.relative_path.as_str()) {
                        summary.ref_paths_changed = true;
                    }
                    changes.record_file(entry.relative_path.clone());
                    changes.record_modified(entry.relative_path.clone());
                    pending.push(PendingUpload::new(entry.path, entry.relative_path));
                }
            }
        }

        debug!(
            root = %root.display(),
            directories = summary.directories,
            files = summary.files,
            modified = summary.modified,
            "Walk finished"
        );
        Ok(summary)
    }

    fn traversal_error(&self, err: walkdir::Error) -> SyncError {
        let path = err
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.scope.root().to_path_buf());
        SyncError::Traversal { path, source: err }
    }
}

impl Iterator for TreeWalker<'_> {
    type Item = Result<WalkEntry, SyncError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(self.traversal_error(err))),
            };

            let Some(relative_path) = self.scope.relative_path(entry.path()) else {
                continue;
            };
            let is_directory = entry.file_type().is_dir();

            if self.matcher.is_ignored(&relative_path, is_directory) {
                if is_directory {
                    self.inner.skip_current_dir();
                }
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(err) => return Some(Err(self.traversal_error(err))),
            };
            let modified_millis = modified_millis(&metadata);

            let kind = if is_directory {
                EntryKind::Directory
            } else if modified_millis > self.cutoff_millis {
                EntryKind::ModifiedFile
            } else {
                EntryKind::File
            };

            trace!(path = %relative_path, ?kind, "Visited");
            return Some(Ok(WalkEntry {
                path: entry.into_path(),
                relative_path,
                kind,
                modified_millis,
            }));
        }
    }
}

/// Modification time in ms since the epoch; 0 where the platform has none
pub fn modified_millis(metadata: &Metadata) -> i64 {
    metadata
        .modified()
        .map(|time| DateTime::<Utc>::from(time).timestamp_millis())
        .unwrap_or(0)
}
