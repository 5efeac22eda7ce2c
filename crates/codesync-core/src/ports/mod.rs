//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are the interfaces the sync core depends on; their implementations
//! live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IProjectRemote`] - Remote file store operations for one project

pub mod project_remote;

pub use project_remote::IProjectRemote;
