//! Domain types
//!
//! This module contains the data that flows through a sync pass:
//! - Newtypes for validated identifiers
//! - Rule types loaded from the project's control files
//! - The per-pass change set and per-file upload outcomes
//! - Wire types exchanged with the remote store
//! - Domain-specific error types

pub mod changeset;
pub mod errors;
pub mod manifest;
pub mod newtypes;
pub mod project;
pub mod rules;

// Re-export commonly used types
pub use changeset::{ChangeSet, UploadOutcome};
pub use errors::DomainError;
pub use manifest::{CompletionManifest, FileUploadMsg, RemoteStatus, SyncResponse};
pub use newtypes::ProjectId;
pub use project::ProjectInfo;
pub use rules::{IgnoreRule, ReferencePath, RuleSet};
