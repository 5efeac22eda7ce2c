//! Control file loading
//!
//! [`RuleStore`] reads the project's ignore-rule and reference-path files.
//! Both are optional, and a file that cannot be read or parsed counts as
//! absent: the pass goes ahead with fewer rules instead of failing. That
//! fallback is [`RuleStore::lenient_parse`].

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use codesync_core::config::SyncConfig;
use codesync_core::domain::rules::{IgnoreRule, IgnoreSettingsFile, RefPathsFile, RuleSet};

/// Names of the two control files at the project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFiles {
    pub ignore_file: String,
    pub ref_paths_file: String,
}

impl ControlFiles {
    pub fn new(ignore_file: impl Into<String>, ref_paths_file: impl Into<String>) -> Self {
        Self {
            ignore_file: ignore_file.into(),
            ref_paths_file: ref_paths_file.into(),
        }
    }
}

impl Default for ControlFiles {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

impl From<&SyncConfig> for ControlFiles {
    fn from(config: &SyncConfig) -> Self {
        Self::new(config.ignore_file.clone(), config.ref_paths_file.clone())
    }
}

/// Loads the rule set of one project
#[derive(Debug, Clone)]
pub struct RuleStore {
    project_root: PathBuf,
    files: ControlFiles,
}

impl RuleStore {
    pub fn new(project_root: impl Into<PathBuf>, files: ControlFiles) -> Self {
        Self {
            project_root: project_root.into(),
            files,
        }
    }

    /// Reads both control files; never fails
    pub fn load(&self) -> RuleSet {
        let ignored_paths = self
            .read::<IgnoreSettingsFile>(&self.files.ignore_file)
            .and_then(|settings| settings.ignored_paths)
            .unwrap_or_default()
            .into_iter()
            .map(IgnoreRule::from)
            .collect::<Vec<_>>();

        let ref_paths = self
            .read::<RefPathsFile>(&self.files.ref_paths_file)
            .and_then(|refs| refs.ref_paths)
            .unwrap_or_default();

        debug!(
            root = %self.project_root.display(),
            ignored = ignored_paths.len(),
            references = ref_paths.len(),
            "Loaded project rules"
        );

        RuleSet::new(ignored_paths, ref_paths)
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.project_root.join(name);
        let content = match std::fs::read(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Control file not present");
                return None;
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Unreadable control file, using no rules");
                return None;
            }
        };
        Self::lenient_parse(&path, &content)
    }

    /// Parses control file content, treating malformed JSON as absent
    ///
    /// Sync has to proceed with corrupted metadata, so a parse failure is
    /// logged and degrades to `None` rather than an error.
    pub fn lenient_parse<T: DeserializeOwned>(path: &Path, content: &[u8]) -> Option<T> {
        match serde_json::from_slice(content) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Malformed control file, using no rules");
                None
            }
        }
    }
}
