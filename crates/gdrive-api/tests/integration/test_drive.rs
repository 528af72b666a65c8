//! Integration tests for path-addressed operations over HTTP
//!
//! Drives the full stack (Drive -> PathResolver -> DriveProvider ->
//! DriveClient) against wiremock and checks how many requests each
//! operation needs.

use gdrive_api::{Drive, DriveProvider, RemoveMode};
use gdrive_core::domain::{DriveError, VirtualPath};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

fn vpath(s: &str) -> VirtualPath {
    VirtualPath::parse(s).unwrap()
}

#[tokio::test]
async fn test_resolution_is_cached_within_a_command() {
    let (server, client, _) = common::setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(wiremock::matchers::query_param(
            "q",
            "'root' in parents and trashed=false",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [
                common::folder_json("docs", "Docs", "root"),
                common::file_json("dup1", "same.txt", "root", 1),
                common::file_json("dup2", "same.txt", "root", 2),
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(wiremock::matchers::query_param(
            "q",
            "'docs' in parents and trashed=false",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [common::file_json("r1", "report.pdf", "docs", 2048)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut drive = Drive::new(DriveProvider::new(client));

    let report = drive.resolve(&vpath("/Docs/report.pdf")).await.unwrap();
    assert_eq!(report.id.as_str(), "r1");
    let again = drive.resolve(&vpath("Docs//report.pdf/")).await.unwrap();
    assert_eq!(again.id, report.id);

    let first = drive.resolve(&vpath("/same.txt")).await.unwrap();
    assert_eq!(first.id.as_str(), "dup1");

    let err = drive.resolve(&vpath("/same.txt/child")).await.unwrap_err();
    assert_eq!(err, DriveError::NotAFolder("/same.txt".into()));
}

#[tokio::test]
async fn test_root_operations_make_no_requests() {
    let (server, client, _) = common::setup_drive_mock().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut drive = Drive::new(DriveProvider::new(client));
    for synonym in ["/", "root", "home", "", "\\"] {
        let root = vpath(synonym);
        assert!(drive.resolve(&root).await.unwrap().id.is_root());
        let err = drive.remove(&root, RemoveMode::Permanent).await.unwrap_err();
        assert!(matches!(err, DriveError::RootProtected(_)));
        let err = drive.share(&root).await.unwrap_err();
        assert!(matches!(err, DriveError::RootProtected(_)));
        let err = drive.move_to(&root, &vpath("/x")).await.unwrap_err();
        assert!(matches!(err, DriveError::RootProtected(_)));
        let err = drive.copy(&root, &vpath("/x")).await.unwrap_err();
        assert!(matches!(err, DriveError::RootProtected(_)));
    }
}

#[tokio::test]
async fn test_rename_invalidates_and_relists() {
    let (server, client, _) = common::setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [common::file_json("a1", "a.txt", "root", 1)]
        })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/drive/v3/files/a1"))
        .and(body_json(json!({ "name": "b.txt" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::file_json("a1", "b.txt", "root", 1)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut drive = Drive::new(DriveProvider::new(client));
    let renamed = drive.rename(&vpath("/a.txt"), "b.txt").await.unwrap();
    assert_eq!(renamed.name, "b.txt");
    assert!(drive.resolver().cache().is_empty());

    // Served by a fresh listing; the mock still reports the old name
    drive.resolve(&vpath("/a.txt")).await.unwrap();
}
