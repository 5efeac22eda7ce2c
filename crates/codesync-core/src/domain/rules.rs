//! Ignore rules and reference paths
//!
//! A project carries two optional JSON control files at its root:
//!
//! - the settings file (`.cw-settings`), whose `ignoredPaths` array holds
//!   glob patterns relative to the project root;
//! - the reference file (`.cw-refpaths.json`), whose `refPaths` array maps
//!   locations outside the tree (`from`) onto project-relative targets (`to`).
//!
//! The types here describe the parsed content only. Loading and the lenient
//! fallback on bad input live in `codesync-sync`.

use serde::{Deserialize, Serialize};

/// A single glob pattern matched against a project-relative path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IgnoreRule(String);

impl IgnoreRule {
    /// Wrap a raw pattern as it appears in the settings file
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    /// The pattern exactly as configured
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The pattern ready for matching
    ///
    /// The raw pattern is cleaned lexically and a single leading `/`, left
    /// over from older settings files, is removed.
    #[must_use]
    pub fn normalized(&self) -> String {
        let cleaned = clean_path(&self.0);
        match cleaned.strip_prefix('/') {
            Some(rest) => rest.to_string(),
            None => cleaned,
        }
    }
}

impl From<&str> for IgnoreRule {
    fn from(pattern: &str) -> Self {
        Self::new(pattern)
    }
}

impl From<String> for IgnoreRule {
    fn from(pattern: String) -> Self {
        Self(pattern)
    }
}

/// Maps an external file onto a path inside the project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencePath {
    /// Source location; absolute, or relative to the project root
    pub from: String,
    /// Target path relative to the project root
    pub to: String,
}

impl ReferencePath {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// The `to` target as a clean, forward-slash relative path
    #[must_use]
    pub fn target(&self) -> String {
        let cleaned = clean_path(&self.to.replace('\\', "/"));
        cleaned.trim_start_matches('/').to_string()
    }
}

/// On-disk shape of the settings file
///
/// Other keys in the file belong to other tools and are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IgnoreSettingsFile {
    #[serde(rename = "ignoredPaths", alias = "IgnoredPaths", default)]
    pub ignored_paths: Option<Vec<String>>,
}

/// On-disk shape of the reference file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefPathsFile {
    #[serde(rename = "refPaths", alias = "RefPaths", default)]
    pub ref_paths: Option<Vec<ReferencePath>>,
}

/// The rules in effect for one sync pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    pub ignored_paths: Vec<IgnoreRule>,
    pub ref_paths: Vec<ReferencePath>,
}

impl RuleSet {
    pub fn new(ignored_paths: Vec<IgnoreRule>, ref_paths: Vec<ReferencePath>) -> Self {
        Self {
            ignored_paths,
            ref_paths,
        }
    }

    /// Ignore rules for the walk of the physical project tree
    ///
    /// Every reference target is appended to the base rules so that a file
    /// physically present at a `to` location is only ever synced through its
    /// reference.
    #[must_use]
    pub fn combined_ignores(&self) -> Vec<IgnoreRule> {
        let mut combined = self.ignored_paths.clone();
        combined.extend(self.ref_paths.iter().map(|r| IgnoreRule::new(r.to.clone())));
        combined
    }

    pub fn is_empty(&self) -> bool {
        self.ignored_paths.is_empty() && self.ref_paths.is_empty()
    }
}

/// Lexically clean a slash-separated path
///
/// Collapses repeated separators, drops `.` elements and resolves `..`
/// against the preceding element. A `..` that would climb above a rooted
/// path is dropped; one that climbs above a relative path is kept. An empty
/// result becomes `"."`.
pub fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for element in path.split('/') {
        match element {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
