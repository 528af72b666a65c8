//! Integration tests for uploads and downloads
//!
//! Verifies the resumable session handshake, the streamed PUT, and the
//! partial-file download path against a wiremock server.

use std::sync::{Arc, Mutex};

use gdrive_api::download::{download_to_file, partial_path};
use gdrive_api::upload::{create_upload_session, upload_file};
use gdrive_core::domain::{DriveError, ObjectId, ProgressCallback, TransferProgress};
use gdrive_core::ports::DownloadSource;
use serde_json::json;
use wiremock::matchers::{body_bytes, body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

fn recorder() -> (Arc<Mutex<Vec<TransferProgress>>>, ProgressCallback) {
    let ticks: Arc<Mutex<Vec<TransferProgress>>> = Arc::default();
    let sink = ticks.clone();
    (ticks, Box::new(move |p| sink.lock().unwrap().push(p)))
}

// ============================================================================
// Upload tests
// ============================================================================

#[tokio::test]
async fn test_upload_session_then_put() {
    let (server, client, _) = common::setup_drive_mock().await;
    let session_url = format!("{}/upload/session/xyz", server.uri());

    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .and(query_param("uploadType", "resumable"))
        .and(header("X-Upload-Content-Length", "11"))
        .and(body_json(json!({ "name": "hello.txt", "parents": ["dest"] })))
        .respond_with(ResponseTemplate::new(200).insert_header("Location", session_url.as_str()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/upload/session/xyz"))
        .and(body_bytes(b"hello world".to_vec()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::file_json("new1", "hello.txt", "dest", 11)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("hello.txt");
    std::fs::write(&source, b"hello world").unwrap();

    let (ticks, callback) = recorder();
    let object = upload_file(
        &client,
        &source,
        &ObjectId::new("dest").unwrap(),
        "hello.txt",
        Some(callback),
    )
    .await
    .unwrap();

    assert_eq!(object.id.as_str(), "new1");
    assert_eq!(object.size, Some(11));
    let ticks = ticks.lock().unwrap();
    let last = ticks.last().unwrap();
    assert_eq!(last.transferred, 11);
    assert_eq!(last.total, 11);
    assert_eq!(last.percent, 100);
}

#[tokio::test]
async fn test_session_without_location_fails() {
    let (server, client, _) = common::setup_drive_mock().await;
    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = create_upload_session(&client, &ObjectId::root(), "a.txt", 3)
        .await
        .unwrap_err();
    assert!(matches!(err, DriveError::UploadSession(_)), "got {err:?}");
}

#[tokio::test]
async fn test_session_unexpected_status_fails() {
    let (server, client, _) = common::setup_drive_mock().await;
    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .respond_with(ResponseTemplate::new(403).set_body_string("storage quota exceeded"))
        .mount(&server)
        .await;

    let err = create_upload_session(&client, &ObjectId::root(), "a.txt", 3)
        .await
        .unwrap_err();
    match err {
        DriveError::UploadSession(message) => assert!(message.contains("403")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_put_failure_reports_body() {
    let (server, client, _) = common::setup_drive_mock().await;
    let session_url = format!("{}/upload/session/bad", server.uri());
    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200).insert_header("Location", session_url.as_str()))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/upload/session/bad"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("a.txt");
    std::fs::write(&source, b"abc").unwrap();

    let err = upload_file(&client, &source, &ObjectId::root(), "a.txt", None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DriveError::Api {
            status: 500,
            message: "backend error".into()
        }
    );
}

#[tokio::test]
async fn test_put_unauthorized_is_auth_error() {
    let (server, client, _) = common::setup_drive_mock().await;
    let session_url = format!("{}/upload/session/expired", server.uri());
    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200).insert_header("Location", session_url.as_str()))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/upload/session/expired"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(common::error_json(401, "Invalid Credentials")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("a.txt");
    std::fs::write(&source, b"abc").unwrap();

    let err = upload_file(&client, &source, &ObjectId::root(), "a.txt", None)
        .await
        .unwrap_err();
    assert_eq!(err, DriveError::Auth("Invalid Credentials".into()));
}

#[tokio::test]
async fn test_upload_missing_local_file() {
    let (_server, client, _) = common::setup_drive_mock().await;
    let err = upload_file(
        &client,
        std::path::Path::new("/no/such/file"),
        &ObjectId::root(),
        "x",
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DriveError::LocalFilesystem(_)));
}

// ============================================================================
// Download tests
// ============================================================================

#[tokio::test]
async fn test_download_content_with_progress() {
    let (server, client, _) = common::setup_drive_mock().await;
    let content: Vec<u8> = (0..200_000).map(|i| (i % 251) as u8).collect();
    Mock::given(method("GET"))
        .and(path("/drive/v3/files/big"))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.clone()))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let destination = tmp.path().join("big.bin");
    let (ticks, callback) = recorder();

    let written = download_to_file(
        &client,
        &DownloadSource::Content(ObjectId::new("big").unwrap()),
        &destination,
        Some(content.len() as u64),
        Some(callback),
    )
    .await
    .unwrap();

    assert_eq!(written, 200_000);
    assert_eq!(std::fs::read(&destination).unwrap(), content);
    assert!(!partial_path(&destination).exists());

    let ticks = ticks.lock().unwrap();
    assert!(!ticks.is_empty());
    assert!(ticks.windows(2).all(|w| w[0].transferred <= w[1].transferred));
    assert_eq!(ticks.last().unwrap().percent, 100);
}

#[tokio::test]
async fn test_download_export_link() {
    let (server, client, _) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/export/doc1"))
        .and(query_param("exportFormat", "pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let destination = tmp.path().join("nested/Plan.pdf");
    let source = DownloadSource::Export {
        mime_type: "application/pdf".into(),
        url: format!("{}/export/doc1?exportFormat=pdf", server.uri()),
    };

    let written = download_to_file(&client, &source, &destination, None, None)
        .await
        .unwrap();
    assert_eq!(written, 8);
    assert_eq!(std::fs::read(&destination).unwrap(), b"%PDF-1.4");
}

#[tokio::test]
async fn test_failed_download_leaves_no_files() {
    let (server, client, _) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(common::error_json(404, "File not found")))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let destination = tmp.path().join("out.bin");
    let err = download_to_file(
        &client,
        &DownloadSource::Content(ObjectId::new("missing").unwrap()),
        &destination,
        None,
        None,
    )
    .await
    .unwrap_err();

    assert!(err.is_not_found());
    assert!(!destination.exists());
    assert!(!partial_path(&destination).exists());
}

#[tokio::test]
async fn test_empty_download_reports_no_progress() {
    let (server, client, _) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(Vec::<u8>::new()))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let destination = tmp.path().join("empty.txt");
    let (ticks, callback) = recorder();

    let written = download_to_file(
        &client,
        &DownloadSource::Content(ObjectId::new("empty").unwrap()),
        &destination,
        Some(0),
        Some(callback),
    )
    .await
    .unwrap();

    assert_eq!(written, 0);
    assert!(destination.exists());
    assert!(ticks.lock().unwrap().is_empty());
}
