//! Integration tests for DriveClient metadata calls
//!
//! Covers pagination, status mapping, credential refresh, and the request
//! shapes of the mutating endpoints.

use gdrive_core::domain::{DriveError, ObjectId, Visibility};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{self, INITIAL_TOKEN, REFRESHED_TOKEN};

fn id(s: &str) -> ObjectId {
    ObjectId::new(s).unwrap()
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_children_sends_parent_query() {
    let (server, client, _) = common::setup_drive_mock().await;
    common::mount_children(
        &server,
        "root",
        vec![
            common::folder_json("f1", "Docs", "root"),
            common::file_json("a1", "notes.txt", "root", 42),
        ],
    )
    .await;

    let children = client.list_children(&ObjectId::root(), false).await.unwrap();
    assert_eq!(children.len(), 2);
    assert!(children[0].is_folder);
    assert_eq!(children[1].name, "notes.txt");
    assert_eq!(children[1].size, Some(42));
}

#[tokio::test]
async fn test_list_follows_next_page_token() {
    let (server, client, _) = common::setup_drive_mock().await;
    let q = "'f1' in parents and trashed=false";

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("q", q))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [common::file_json("b", "second", "f1", 2)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("q", q))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [common::file_json("a", "first", "f1", 1)],
            "nextPageToken": "page-2"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let children = client.list_children(&id("f1"), false).await.unwrap();
    let names: Vec<_> = children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[tokio::test]
async fn test_list_trash_query() {
    let (server, client, _) = common::setup_drive_mock().await;
    let mut trashed = common::file_json("t1", "old.txt", "root", 1);
    trashed["trashed"] = json!(true);

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("q", "trashed=true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": [trashed] })))
        .mount(&server)
        .await;

    let trash = client.list_trash().await.unwrap();
    assert_eq!(trash.len(), 1);
    assert!(trash[0].trashed);
}

// ============================================================================
// Status mapping and credentials
// ============================================================================

#[tokio::test]
async fn test_get_object_404_is_not_found() {
    let (server, client, _) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(common::error_json(404, "File not found: gone.")))
        .mount(&server)
        .await;

    let err = client.get_object(&id("gone")).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_api_error_carries_store_message() {
    let (server, client, _) = common::setup_drive_mock().await;
    Mock::given(method("PATCH"))
        .and(path("/drive/v3/files/a1"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(common::error_json(403, "Insufficient permissions")),
        )
        .mount(&server)
        .await;

    let err = client.rename(&id("a1"), "new").await.unwrap_err();
    assert_eq!(
        err,
        DriveError::Api {
            status: 403,
            message: "Insufficient permissions".into()
        }
    );
}

#[tokio::test]
async fn test_unauthorized_refreshes_and_retries_once() {
    let (server, client, credentials) = common::setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files/a1"))
        .and(header("authorization", format!("Bearer {INITIAL_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(401).set_body_json(common::error_json(401, "Invalid Credentials")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files/a1"))
        .and(header("authorization", format!("Bearer {REFRESHED_TOKEN}").as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::file_json("a1", "a.txt", "root", 1)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let object = client.get_object(&id("a1")).await.unwrap();
    assert_eq!(object.name, "a.txt");
    assert_eq!(credentials.refreshes(), 1);
}

#[tokio::test]
async fn test_second_unauthorized_is_auth_error() {
    let (server, client, credentials) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files/a1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(common::error_json(401, "Invalid Credentials")))
        .expect(2)
        .mount(&server)
        .await;

    let err = client.get_object(&id("a1")).await.unwrap_err();
    assert_eq!(err, DriveError::Auth("Invalid Credentials".into()));
    assert_eq!(credentials.refreshes(), 1);
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let (server, client, _) = common::setup_drive_mock().await;
    drop(server);

    let err = client.get_object(&id("a1")).await.unwrap_err();
    assert!(matches!(err, DriveError::Network(_)), "got {err:?}");
}

// ============================================================================
// Mutations
// ============================================================================

#[tokio::test]
async fn test_create_folder_request_shape() {
    let (server, client, _) = common::setup_drive_mock().await;
    Mock::given(method("POST"))
        .and(path("/drive/v3/files"))
        .and(body_json(json!({
            "name": "Projects",
            "mimeType": "application/vnd.google-apps.folder",
            "parents": ["root"]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::folder_json("p1", "Projects", "root")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let folder = client.create_folder("Projects", &ObjectId::root()).await.unwrap();
    assert!(folder.is_folder);
    assert_eq!(folder.id, id("p1"));
}

#[tokio::test]
async fn test_set_parent_adds_and_removes() {
    let (server, client, _) = common::setup_drive_mock().await;
    Mock::given(method("PATCH"))
        .and(path("/drive/v3/files/a1"))
        .and(query_param("addParents", "dest"))
        .and(query_param("removeParents", "root,old"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::file_json("a1", "a.txt", "dest", 1)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let moved = client
        .set_parent(&id("a1"), &id("dest"), &[ObjectId::root(), id("old")])
        .await
        .unwrap();
    assert_eq!(moved.parent_ids, vec![id("dest")]);
}

#[tokio::test]
async fn test_copy_and_trash_bodies() {
    let (server, client, _) = common::setup_drive_mock().await;
    Mock::given(method("POST"))
        .and(path("/drive/v3/files/a1/copy"))
        .and(body_json(json!({ "parents": ["dest"] })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::file_json("c1", "a.txt", "dest", 1)),
        )
        .expect(1)
        .mount(&server)
        .await;
    let mut trashed = common::file_json("a1", "a.txt", "root", 1);
    trashed["trashed"] = json!(true);
    Mock::given(method("PATCH"))
        .and(path("/drive/v3/files/a1"))
        .and(body_json(json!({ "trashed": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(trashed))
        .expect(1)
        .mount(&server)
        .await;

    let copy = client.copy(&id("a1"), &id("dest")).await.unwrap();
    assert_eq!(copy.id, id("c1"));
    let object = client.set_trashed(&id("a1"), true).await.unwrap();
    assert!(object.trashed);
}

#[tokio::test]
async fn test_delete_and_empty_trash() {
    let (server, client, _) = common::setup_drive_mock().await;
    Mock::given(method("DELETE"))
        .and(path("/drive/v3/files/a1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/drive/v3/files/trash"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.delete(&id("a1")).await.unwrap();
    client.empty_trash().await.unwrap();
}

#[tokio::test]
async fn test_delete_root_refused_without_request() {
    let (server, client, _) = common::setup_drive_mock().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.delete(&ObjectId::root()).await.unwrap_err();
    assert!(matches!(err, DriveError::RootProtected(_)));
}

#[tokio::test]
async fn test_set_permission_public_and_private() {
    let (server, client, _) = common::setup_drive_mock().await;
    Mock::given(method("POST"))
        .and(path("/drive/v3/files/a1/permissions"))
        .and(body_json(json!({ "role": "reader", "type": "anyone" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "anyoneWithLink" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/drive/v3/files/a1/permissions/anyoneWithLink"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.set_permission(&id("a1"), Visibility::Public).await.unwrap();
    client.set_permission(&id("a1"), Visibility::Private).await.unwrap();
}

#[tokio::test]
async fn test_make_private_when_not_public_succeeds() {
    let (server, client, _) = common::setup_drive_mock().await;
    Mock::given(method("DELETE"))
        .and(path("/drive/v3/files/a1/permissions/anyoneWithLink"))
        .respond_with(ResponseTemplate::new(404).set_body_json(common::error_json(404, "Permission not found")))
        .mount(&server)
        .await;

    client.set_permission(&id("a1"), Visibility::Private).await.unwrap();
}
