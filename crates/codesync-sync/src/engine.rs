//! Sync pass orchestration
//!
//! The [`SyncEngine`] drives one pass of one-way synchronization from a local
//! project directory to the remote store.
//!
//! ## Pass Flow
//!
//! 1. **ValidateLocalPath**: a missing directory is either reported to the
//!    remote or rejected as a stale configuration
//! 2. **WalkLocal**: walk the project tree with the ignore rules plus every
//!    reference target excluded
//! 3. **WalkReferences**: walk each reference source into its target path,
//!    forcing a full resync when the reference file itself changed
//! 4. **Reconcile**: upload files the remote has never recorded
//! 5. **Complete**: send the completion manifest, exactly once
//!
//! Uploads happen between the walks and reconciliation. Per-file failures
//! and bad references never abort the pass.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use codesync_core::config::Config;
use codesync_core::domain::changeset::ChangeSet;
use codesync_core::domain::manifest::{CompletionManifest, SyncResponse};
use codesync_core::domain::newtypes::ProjectId;
use codesync_core::domain::rules::{ReferencePath, RuleSet};
use codesync_core::ports::project_remote::IProjectRemote;

use crate::matcher::PathMatcher;
use crate::rules::{ControlFiles, RuleStore};
use crate::upload::UploadCoordinator;
use crate::walker::{PendingUpload, TreeWalker, WalkScope, WalkSummary};
use crate::SyncError;

// ============================================================================
// Request / report
// ============================================================================

/// Input of one sync pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    pub project_path: PathBuf,
    pub project_id: ProjectId,
    /// Cutoff in ms since the epoch; files modified later are uploaded
    pub last_sync_millis: i64,
}

impl SyncRequest {
    pub fn new(project_path: impl Into<PathBuf>, project_id: ProjectId, last_sync_millis: i64) -> Self {
        Self {
            project_path: project_path.into(),
            project_id,
            last_sync_millis,
        }
    }
}

/// Result of a pass that reached completion
#[derive(Debug)]
pub struct SyncReport {
    pub response: SyncResponse,
    /// The manifest that was sent; its timestamp is the next cutoff
    pub manifest: CompletionManifest,
    /// Aggregated reference problems, always [`SyncError::References`]
    pub warning: Option<SyncError>,
}

impl SyncReport {
    /// Cutoff to pass to the next sync of this project
    pub fn next_cutoff_millis(&self) -> i64 {
        self.manifest.time_stamp
    }
}

// ============================================================================
// Phases
// ============================================================================

/// States of a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    ValidateLocalPath,
    WalkLocal,
    WalkReferences,
    Reconcile,
    Complete,
    Aborted,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncPhase::ValidateLocalPath => "validate_local_path",
            SyncPhase::WalkLocal => "walk_local",
            SyncPhase::WalkReferences => "walk_references",
            SyncPhase::Reconcile => "reconcile",
            SyncPhase::Complete => "complete",
            SyncPhase::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Tracks the current phase and logs transitions
#[derive(Debug)]
struct PhaseTracker {
    current: SyncPhase,
}

impl PhaseTracker {
    fn new() -> Self {
        debug!(phase = %SyncPhase::ValidateLocalPath, "Sync phase");
        Self {
            current: SyncPhase::ValidateLocalPath,
        }
    }

    fn enter(&mut self, next: SyncPhase) {
        debug!(from = %self.current, to = %next, "Sync phase");
        self.current = next;
    }
}

// ============================================================================
// Source index
// ============================================================================

/// Maps a relative path back to the file its content is read from
///
/// Paths under a reference target resolve into the reference source, every
/// other path resolves under the project root.
#[derive(Debug, Clone)]
struct SourceIndex {
    project_root: PathBuf,
    references: Vec<(String, PathBuf)>,
}

impl SourceIndex {
    fn new(project_root: &Path) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            references: Vec::new(),
        }
    }

    fn add_reference(&mut self, target: String, source: PathBuf) {
        self.references.push((target, source));
    }

    fn source_for(&self, relative_path: &str) -> PathBuf {
        for (target, source) in &self.references {
            if relative_path == target {
                return source.clone();
            }
            if let Some(rest) = relative_path
                .strip_prefix(target.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
            {
                return source.join(rest);
            }
        }
        self.project_root.join(relative_path)
    }
}

/// Output of the reference phase
struct ReferenceWalk {
    changes: ChangeSet,
    pending: Vec<PendingUpload>,
    index: SourceIndex,
    warnings: Vec<String>,
}

// ============================================================================
// SyncEngine
// ============================================================================

/// Runs sync passes against one remote store
pub struct SyncEngine {
    remote: Arc<dyn IProjectRemote>,
    control_files: ControlFiles,
    upload_concurrency: usize,
}

impl SyncEngine {
    pub fn new(remote: Arc<dyn IProjectRemote>, config: &Config) -> Self {
        Self {
            remote,
            control_files: ControlFiles::from(&config.sync),
            upload_concurrency: config.sync.upload_concurrency.max(1) as usize,
        }
    }

    /// Runs one full pass
    ///
    /// # Errors
    /// Returns the fatal error that aborted the pass. Reference problems are
    /// not errors; they come back as [`SyncReport::warning`].
    #[tracing::instrument(
        skip(self, request),
        fields(project_id = %request.project_id, path = %request.project_path.display())
    )]
    pub async fn sync(&self, request: &SyncRequest) -> Result<SyncReport, SyncError> {
        let pass_started_millis = Utc::now().timestamp_millis();
        let mut phase = PhaseTracker::new();

        match self.run_pass(request, pass_started_millis, &mut phase).await {
            Ok(report) => {
                phase.enter(SyncPhase::Complete);
                info!(
                    status = %report.response.status,
                    files = report.manifest.file_list.len(),
                    modified = report.manifest.modified_list.len(),
                    uploads = report.response.uploaded_files.len(),
                    warning = report.warning.is_some(),
                    "Sync pass complete"
                );
                Ok(report)
            }
            Err(err) => {
                phase.enter(SyncPhase::Aborted);
                warn!(op = err.op(), error = %err, "Sync pass aborted");
                Err(err)
            }
        }
    }

    async fn run_pass(
        &self,
        request: &SyncRequest,
        pass_started_millis: i64,
        phase: &mut PhaseTracker,
    ) -> Result<SyncReport, SyncError> {
        self.validate_local_path(request).await?;

        let rules = self.load_rules(&request.project_path).await?;
        let uploader = UploadCoordinator::new(
            Arc::clone(&self.remote),
            request.project_id.clone(),
            self.upload_concurrency,
        );

        phase.enter(SyncPhase::WalkLocal);
        let (changes, mut pending, summary) = self.walk_local(request, &rules).await?;

        phase.enter(SyncPhase::WalkReferences);
        let reference_cutoff = if summary.ref_paths_changed {
            debug!("Reference file changed, resyncing every reference");
            0
        } else {
            request.last_sync_millis
        };
        let ReferenceWalk {
            mut changes,
            pending: reference_pending,
            index,
            warnings,
        } = self
            .walk_references(request, &rules, changes, reference_cutoff)
            .await?;
        pending.extend(reference_pending);

        let outcomes = uploader.upload_all(pending).await;
        changes.record_outcomes(outcomes);

        phase.enter(SyncPhase::Reconcile);
        self.reconcile(&request.project_id, &mut changes, &index, &uploader)
            .await;

        let manifest = changes.to_manifest(pass_started_millis);
        let status = self
            .remote
            .complete_upload(&request.project_id, &manifest)
            .await
            .map_err(|source| SyncError::Complete {
                project_id: request.project_id.to_string(),
                source,
            })?;

        let warning = (!warnings.is_empty()).then(|| SyncError::References(warnings.join("\n")));

        Ok(SyncReport {
            response: SyncResponse {
                status: status.status,
                status_code: status.status_code,
                uploaded_files: changes.uploaded_files,
            },
            manifest,
            warning,
        })
    }

    /// Aborts the pass when the project directory is gone
    async fn validate_local_path(&self, request: &SyncRequest) -> Result<(), SyncError> {
        if tokio::fs::metadata(&request.project_path).await.is_ok() {
            return Ok(());
        }

        let project = self
            .remote
            .get_project(&request.project_id)
            .await
            .map_err(|source| SyncError::ProjectLookup {
                project_id: request.project_id.to_string(),
                source,
            })?;

        if request.project_path != Path::new(&project.location_on_disk) {
            return Err(SyncError::PathMismatch {
                path: request.project_path.clone(),
                recorded: project.location_on_disk,
            });
        }

        self.remote
            .notify_missing_local_dir(&request.project_id)
            .await
            .map_err(|source| SyncError::Notify {
                path: request.project_path.clone(),
                source,
            })?;

        info!(path = %request.project_path.display(), "Reported missing project directory");
        Err(SyncError::MissingProjectDir(request.project_path.clone()))
    }

    async fn load_rules(&self, project_path: &Path) -> Result<RuleSet, SyncError> {
        let store = RuleStore::new(project_path, self.control_files.clone());
        Ok(tokio::task::spawn_blocking(move || store.load()).await?)
    }

    /// Walks the physical project tree
    #[tracing::instrument(skip_all)]
    async fn walk_local(
        &self,
        request: &SyncRequest,
        rules: &RuleSet,
    ) -> Result<(ChangeSet, Vec<PendingUpload>, WalkSummary), SyncError> {
        let matcher = PathMatcher::new(&rules.combined_ignores());
        let scope = WalkScope::project(&request.project_path);
        let cutoff = request.last_sync_millis;
        let watched = self.control_files.ref_paths_file.clone();

        tokio::task::spawn_blocking(move || {
            let mut changes = ChangeSet::new();
            let mut pending = Vec::new();
            let summary = TreeWalker::new(scope, &matcher, cutoff)
                .watching(watched)
                .collect_into(&mut changes, &mut pending)?;
            Ok::<_, SyncError>((changes, pending, summary))
        })
        .await?
    }

    /// Walks each reference source into its target
    ///
    /// Only the base ignore rules apply here; reference targets are excluded
    /// from the local walk alone.
    #[tracing::instrument(skip_all, fields(references = rules.ref_paths.len(), cutoff = cutoff))]
    async fn walk_references(
        &self,
        request: &SyncRequest,
        rules: &RuleSet,
        changes: ChangeSet,
        cutoff: i64,
    ) -> Result<ReferenceWalk, SyncError> {
        let matcher = PathMatcher::new(&rules.ignored_paths);
        let references = rules.ref_paths.clone();
        let project_root = request.project_path.clone();

        tokio::task::spawn_blocking(move || {
            let mut walk = ReferenceWalk {
                changes,
                pending: Vec::new(),
                index: SourceIndex::new(&project_root),
                warnings: Vec::new(),
            };

            for reference in &references {
                let source = resolve_source(&project_root, reference);
                if let Err(cause) = check_reference_source(&source) {
                    warn!(from = %source.display(), %cause, "Skipping invalid file reference");
                    walk.warnings
                        .push(format!("invalid file reference \"{}\": {cause}", source.display()));
                    continue;
                }

                let target = reference.target();
                walk.index.add_reference(target.clone(), source.clone());
                TreeWalker::new(WalkScope::reference(source, target), &matcher, cutoff)
                    .collect_into(&mut walk.changes, &mut walk.pending)?;
            }

            Ok::<_, SyncError>(walk)
        })
        .await?
    }

    /// Uploads files the remote has no record of
    ///
    /// Files already uploaded in this pass are only listed, not sent again.
    /// A failed list fetch skips reconciliation.
    async fn reconcile(
        &self,
        project_id: &ProjectId,
        changes: &mut ChangeSet,
        index: &SourceIndex,
        uploader: &UploadCoordinator,
    ) {
        let previous = match self.remote.get_file_list(project_id).await {
            Ok(previous) => previous,
            Err(err) => {
                warn!(error = %format!("{err:#}"), "Could not fetch previous file list, skipping reconciliation");
                return;
            }
        };

        let added = changes.files_missing_from(&previous);
        if added.is_empty() {
            return;
        }
        debug!(count = added.len(), "Files unknown to the remote");

        let mut pending = Vec::new();
        for relative_path in added {
            if !changes.is_modified(&relative_path) {
                pending.push(PendingUpload::new(index.source_for(&relative_path), relative_path.clone()));
            }
            changes.record_modified(relative_path);
        }

        let outcomes = uploader.upload_all(pending).await;
        changes.record_outcomes(outcomes);
    }
}

/// Absolute location of a reference source
fn resolve_source(project_root: &Path, reference: &ReferencePath) -> PathBuf {
    let from = Path::new(&reference.from);
    if from.is_absolute() {
        from.to_path_buf()
    } else {
        project_root.join(from)
    }
}

/// Only existing regular files can be referenced
fn check_reference_source(source: &Path) -> Result<(), String> {
    match std::fs::metadata(source) {
        Ok(metadata) if metadata.is_dir() => Err("is a directory".to_string()),
        Ok(_) => Ok(()),
        Err(err) => Err(err.to_string()),
    }
}
