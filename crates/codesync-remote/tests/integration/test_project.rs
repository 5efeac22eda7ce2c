//! Integration tests for the project metadata endpoints
//!
//! Covers project lookup, the recorded file list and the missing-directory
//! signal, including their error classification.

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

use codesync_core::domain::ProjectId;
use codesync_core::ports::project_remote::IProjectRemote;
use codesync_remote::client::RemoteClient;
use codesync_remote::provider::HttpProjectRemote;
use codesync_remote::RemoteError;

use crate::common::{self, PROJECT_ID};

fn project_id() -> ProjectId {
    PROJECT_ID.parse().expect("valid project id")
}

#[tokio::test]
async fn test_get_project_parses_metadata() {
    let (server, remote) = common::setup_remote_mock().await;
    common::mount_project(&server, "/home/dev/nodeapp").await;

    let project = remote.get_project(&project_id()).await.expect("get_project failed");

    assert_eq!(project.project_id, PROJECT_ID);
    assert_eq!(project.name, "nodeapp");
    assert_eq!(project.location_on_disk, "/home/dev/nodeapp");
}

#[tokio::test]
async fn test_requests_carry_bearer_token() {
    let (server, remote) = common::setup_remote_mock().await;
    Mock::given(method("GET"))
        .and(path(common::project_path("/fileList")))
        .and(header("Authorization", "Bearer test-access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(["a.txt"])))
        .expect(1)
        .mount(&server)
        .await;

    let files = remote.get_file_list(&project_id()).await.expect("get_file_list failed");
    assert_eq!(files, vec!["a.txt"]);
}

#[tokio::test]
async fn test_get_project_not_found() {
    let (server, remote) = common::setup_remote_mock().await;
    Mock::given(method("GET"))
        .and(path(common::project_path("")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = remote.get_project(&project_id()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RemoteError>(),
        Some(RemoteError::NotFound(_))
    ));
    assert!(format!("{err:#}").contains("Failed to fetch project b1a78500"));
}

#[tokio::test]
async fn test_file_list_malformed_body() {
    let (server, remote) = common::setup_remote_mock().await;
    Mock::given(method("GET"))
        .and(path(common::project_path("/fileList")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = remote.get_file_list(&project_id()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RemoteError>(),
        Some(RemoteError::InvalidResponse { .. })
    ));
}

#[tokio::test]
async fn test_notify_missing_dir_accepts_200_only() {
    let (server, remote) = common::setup_remote_mock().await;
    common::mount_missing_dir(&server, 200).await;
    remote
        .notify_missing_local_dir(&project_id())
        .await
        .expect("notify failed");

    let (server, remote) = common::setup_remote_mock().await;
    common::mount_missing_dir(&server, 202).await;
    let err = remote.notify_missing_local_dir(&project_id()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RemoteError>(),
        Some(RemoteError::Status { status: 202, .. })
    ));
}

#[tokio::test]
async fn test_unreachable_remote_is_network_error() {
    // nothing listens on the reserved tcpmux port
    let client = RemoteClient::with_base_url("http://127.0.0.1:1").expect("valid URL");
    let remote = HttpProjectRemote::new(client);

    let err = remote.get_file_list(&project_id()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RemoteError>(),
        Some(RemoteError::Network(_))
    ));
}
