//! End-to-end sync pass over HTTP
//!
//! Runs the SyncEngine against HttpProjectRemote backed by a mock server and
//! checks the requests that reach the wire.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use codesync_core::config::ConfigBuilder;
use codesync_sync::engine::{SyncEngine, SyncRequest};
use codesync_sync::SyncError;

use crate::common::{self, PROJECT_ID};

const CUTOFF: i64 = 1_500_000_000_000;

fn write(root: &std::path::Path, relative: &str, mtime_millis: u64) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    std::fs::write(&path, relative).expect("write file");
    std::fs::File::options()
        .write(true)
        .open(&path)
        .and_then(|f| f.set_modified(SystemTime::UNIX_EPOCH + Duration::from_millis(mtime_millis)))
        .expect("set mtime");
}

#[tokio::test]
async fn test_pass_uploads_and_completes() {
    let project = tempfile::tempdir().expect("tempdir");
    write(project.path(), "a.txt", 1_000_000_000_000);
    write(project.path(), "src/b.txt", 1_600_000_000_000);

    let (server, remote) = common::setup_remote_mock().await;
    common::mount_file_list(&server, &["a.txt", "src/b.txt"]).await;
    common::mount_upload(&server, 200).await;
    common::mount_complete(&server, 200).await;

    let engine = SyncEngine::new(Arc::new(remote), &ConfigBuilder::new().build());
    let request = SyncRequest::new(project.path(), PROJECT_ID.parse().expect("id"), CUTOFF);
    let report = engine.sync(&request).await.expect("sync failed");

    assert_eq!(report.response.status, "200 OK");
    assert_eq!(report.response.uploaded_files.len(), 1);
    assert_eq!(report.response.uploaded_files[0].file_path, "src/b.txt");

    let uploads = common::received_json(&server, &common::project_path("/upload")).await;
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0]["path"], "src/b.txt");
    assert_eq!(uploads[0]["isDirectory"], false);

    let completions = common::received_json(&server, &common::project_path("/upload/end")).await;
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0]["fileList"], serde_json::json!(["a.txt", "src/b.txt"]));
    assert_eq!(completions[0]["directoryList"], serde_json::json!(["src"]));
    assert_eq!(completions[0]["modifiedList"], serde_json::json!(["src/b.txt"]));
    assert_eq!(completions[0]["timeStamp"], report.manifest.time_stamp);
}

#[tokio::test]
async fn test_missing_directory_is_reported() {
    let parent = tempfile::tempdir().expect("tempdir");
    let gone = parent.path().join("nodeapp");

    let (server, remote) = common::setup_remote_mock().await;
    common::mount_project(&server, &gone.display().to_string()).await;
    common::mount_missing_dir(&server, 200).await;

    let engine = SyncEngine::new(Arc::new(remote), &ConfigBuilder::new().build());
    let request = SyncRequest::new(&gone, PROJECT_ID.parse().expect("id"), CUTOFF);
    let err = engine.sync(&request).await.unwrap_err();

    assert!(matches!(err, SyncError::MissingProjectDir(_)));
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests
        .iter()
        .any(|r| r.url.path() == common::project_path("/missingLocalDir")));
    assert!(!requests
        .iter()
        .any(|r| r.url.path() == common::project_path("/upload/end")));
}
