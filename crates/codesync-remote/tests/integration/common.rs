//! Shared test helpers for remote API integration tests
//!
//! Each helper mounts one endpoint of the project API on a wiremock server.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use codesync_remote::client::RemoteClient;
use codesync_remote::provider::HttpProjectRemote;

pub const PROJECT_ID: &str = "b1a78500";

/// Starts a mock server and returns an adapter pointing at it
pub async fn setup_remote_mock() -> (MockServer, HttpProjectRemote) {
    let server = MockServer::start().await;
    let client = RemoteClient::with_base_url(server.uri())
        .expect("mock server URI")
        .with_access_token("test-access-token");
    (server, HttpProjectRemote::new(client))
}

pub fn project_path(suffix: &str) -> String {
    format!("/api/v1/projects/{PROJECT_ID}{suffix}")
}

/// Mounts `GET /api/v1/projects/{id}`
pub async fn mount_project(server: &MockServer, location_on_disk: &str) {
    Mock::given(method("GET"))
        .and(path(project_path("")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "projectID": PROJECT_ID,
            "name": "nodeapp",
            "locOnDisk": location_on_disk,
            "language": "nodejs",
            "state": "open"
        })))
        .mount(server)
        .await;
}

/// Mounts `GET /api/v1/projects/{id}/fileList`
pub async fn mount_file_list(server: &MockServer, files: &[&str]) {
    Mock::given(method("GET"))
        .and(path(project_path("/fileList")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(files)))
        .mount(server)
        .await;
}

/// Mounts `PUT /api/v1/projects/{id}/upload` answering with `status`
pub async fn mount_upload(server: &MockServer, status: u16) {
    Mock::given(method("PUT"))
        .and(path(project_path("/upload")))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Mounts `POST /api/v1/projects/{id}/upload/end` answering with `status`
pub async fn mount_complete(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path(project_path("/upload/end")))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Mounts `POST /api/v1/projects/{id}/missingLocalDir` answering with `status`
pub async fn mount_missing_dir(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path(project_path("/missingLocalDir")))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Bodies of every received request to `endpoint`, parsed as JSON
pub async fn received_json(server: &MockServer, endpoint: &str) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == endpoint)
        .map(|request| serde_json::from_slice(&request.body).expect("JSON body"))
        .collect()
}
