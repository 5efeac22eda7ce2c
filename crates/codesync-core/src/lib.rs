//! Codesync Core - Domain types and port definitions
//!
//! This crate contains the pieces shared by every other codesync crate:
//! - **Domain types** - `RuleSet`, `ChangeSet`, `CompletionManifest`, `FileUploadMsg`, `ProjectInfo`
//! - **Port definitions** - `IProjectRemote`, the boundary to the remote file store
//! - **Configuration** - YAML-backed `Config` with validation and a builder
//!
//! # Architecture
//!
//! The domain module holds plain data with serde wire formats and no I/O.
//! Ports define the trait that adapter crates implement; the sync engine
//! in `codesync-sync` only ever talks to the remote through it.

pub mod config;
pub mod domain;
pub mod ports;
