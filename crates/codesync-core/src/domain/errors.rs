//! Domain error types
//!
//! Validation failures raised while constructing domain values.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid project identifier
    #[error("Invalid project ID: {0}")]
    InvalidProjectId(String),
}
