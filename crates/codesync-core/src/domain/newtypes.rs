//! Domain newtypes with validation
//!
//! Strongly-typed wrappers that check their invariants at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Identifier of a project on the remote store
///
/// The ID is interpolated into request URLs, so it must be non-empty and
/// must not contain path separators, whitespace or query characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectId(String);

impl ProjectId {
    /// Create a new ProjectId
    ///
    /// # Errors
    /// Returns error if the ID is empty or contains URL-unsafe characters
    pub fn new(id: String) -> Result<Self, DomainError> {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidProjectId(
                "Project ID cannot be empty".to_string(),
            ));
        }

        if !trimmed
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(DomainError::InvalidProjectId(format!(
                "Project ID contains invalid characters: {trimmed}"
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProjectId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for ProjectId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ProjectId> for String {
    fn from(id: ProjectId) -> Self {
        id.0
    }
}
