//! Integration tests for the upload and completion endpoints

use codesync_core::domain::manifest::{CompletionManifest, FileUploadMsg};
use codesync_core::domain::ProjectId;
use codesync_core::ports::project_remote::IProjectRemote;

use crate::common::{self, PROJECT_ID};

fn project_id() -> ProjectId {
    PROJECT_ID.parse().expect("valid project id")
}

fn message() -> FileUploadMsg {
    FileUploadMsg {
        is_directory: false,
        mode: 0o644,
        relative_path: "src/app.js".into(),
        message: "eJzLSM3JyQcABiwCFQ==".into(),
    }
}

#[tokio::test]
async fn test_upload_sends_envelope() {
    let (server, remote) = common::setup_remote_mock().await;
    common::mount_upload(&server, 200).await;

    let status = remote
        .upload_file(&project_id(), &message())
        .await
        .expect("upload failed");

    assert_eq!(status.status, "200 OK");
    assert_eq!(status.status_code, 200);

    let bodies = common::received_json(&server, &common::project_path("/upload")).await;
    assert_eq!(
        bodies,
        vec![serde_json::json!({
            "isDirectory": false,
            "mode": 420,
            "path": "src/app.js",
            "msg": "eJzLSM3JyQcABiwCFQ=="
        })]
    );
}

#[tokio::test]
async fn test_upload_rejection_is_not_an_error() {
    let (server, remote) = common::setup_remote_mock().await;
    common::mount_upload(&server, 413).await;

    let status = remote
        .upload_file(&project_id(), &message())
        .await
        .expect("rejection is a status, not an error");

    assert_eq!(status.status, "413 Payload Too Large");
    assert_eq!(status.status_code, 413);
    assert!(!status.is_success());
}

#[tokio::test]
async fn test_complete_sends_manifest() {
    let (server, remote) = common::setup_remote_mock().await;
    common::mount_complete(&server, 200).await;

    let manifest = CompletionManifest {
        file_list: vec!["a.txt".into(), "src/b.txt".into()],
        directory_list: vec!["src".into()],
        modified_list: vec!["src/b.txt".into()],
        time_stamp: 1_700_000_000_000,
    };
    let status = remote
        .complete_upload(&project_id(), &manifest)
        .await
        .expect("complete failed");
    assert_eq!(status.status, "200 OK");

    let bodies = common::received_json(&server, &common::project_path("/upload/end")).await;
    assert_eq!(
        bodies,
        vec![serde_json::json!({
            "fileList": ["a.txt", "src/b.txt"],
            "directoryList": ["src"],
            "modifiedList": ["src/b.txt"],
            "timeStamp": 1_700_000_000_000_i64
        })]
    );
}
