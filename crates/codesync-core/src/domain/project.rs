//! Remote project metadata

use serde::{Deserialize, Serialize};

/// What the remote store knows about a project
///
/// Only the fields the sync engine reads are modelled; the remote sends
/// many more and they are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    #[serde(rename = "projectID")]
    pub project_id: String,
    #[serde(default)]
    pub name: String,
    /// Local directory the project was bound from
    #[serde(rename = "locOnDisk", default)]
    pub location_on_disk: String,
}
