//! Integration tests for codesync-remote
//!
//! Uses wiremock to simulate the remote project API and verifies the
//! RemoteClient requests, the HttpProjectRemote port adapter and a full
//! sync pass over HTTP.

mod common;

mod test_project;
mod test_sync_pass;
mod test_upload;
