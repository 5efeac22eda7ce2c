//! Codesync Remote - HTTP adapter for the remote project store
//!
//! Provides:
//! - A typed `reqwest` client for the project API endpoints
//! - [`provider::HttpProjectRemote`], the `IProjectRemote` implementation
//!   used by the sync engine
//!
//! ## Modules
//!
//! - [`client`] - Remote API HTTP client
//! - [`provider`] - Port adapter wrapping the client

pub mod client;
pub mod provider;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the remote store
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The configured base URL cannot be used
    #[error("Invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The base URL parsed but is not an http(s) URL
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    /// Authentication credentials were rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The project or endpoint does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other unexpected status
    #[error("Unexpected status {status} from {endpoint}")]
    Status { status: u16, endpoint: String },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body could not be parsed
    #[error("Invalid response from {endpoint}: {message}")]
    InvalidResponse { endpoint: String, message: String },
}

impl RemoteError {
    /// Classifies a non-success status for `endpoint`
    pub fn from_status(status: StatusCode, endpoint: &str) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                RemoteError::Unauthorized(format!("{endpoint} returned {status}"))
            }
            StatusCode::NOT_FOUND => RemoteError::NotFound(endpoint.to_string()),
            other => RemoteError::Status {
                status: other.as_u16(),
                endpoint: endpoint.to_string(),
            },
        }
    }
}

/// Canonical status line, e.g. `"200 OK"`
pub fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
