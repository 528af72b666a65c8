//! Shared test helpers for Drive API integration tests
//!
//! Provides a wiremock server plus a DriveClient pointed at it, and
//! builders for the `File` resources the mock endpoints return.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use gdrive_api::client::DriveClient;
use gdrive_core::domain::DriveError;
use gdrive_core::ports::ICredentialProvider;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Token handed out before any refresh
pub const INITIAL_TOKEN: &str = "test-access-token";

/// Token handed out after a refresh
pub const REFRESHED_TOKEN: &str = "refreshed-token";

/// Credential provider that counts refreshes
#[derive(Default)]
pub struct TestCredentials {
    refreshes: AtomicUsize,
}

impl TestCredentials {
    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ICredentialProvider for TestCredentials {
    async fn access_token(&self) -> Result<String, DriveError> {
        if self.refreshes() == 0 {
            Ok(INITIAL_TOKEN.to_string())
        } else {
            Ok(REFRESHED_TOKEN.to_string())
        }
    }

    async fn refresh(&self) -> Result<String, DriveError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(REFRESHED_TOKEN.to_string())
    }
}

/// Starts a mock server and returns a client whose metadata and upload
/// base URLs both point at it
pub async fn setup_drive_mock() -> (MockServer, DriveClient, Arc<TestCredentials>) {
    let server = MockServer::start().await;
    let credentials = Arc::new(TestCredentials::default());
    let client = DriveClient::with_base_urls(
        credentials.clone(),
        format!("{}/drive/v3", server.uri()),
        format!("{}/upload/drive/v3", server.uri()),
    );
    (server, client, credentials)
}

/// JSON for a regular file resource
pub fn file_json(id: &str, name: &str, parent: &str, size: u64) -> Value {
    json!({
        "id": id,
        "name": name,
        "mimeType": "text/plain",
        "size": size.to_string(),
        "parents": [parent],
        "createdTime": "2024-03-01T12:00:00.123Z",
        "modifiedTime": "2024-03-01T12:00:00.123Z",
        "webContentLink": format!("https://drive.google.com/uc?id={id}&export=download"),
        "webViewLink": format!("https://drive.google.com/file/d/{id}/view"),
        "originalFilename": name,
        "trashed": false
    })
}

/// JSON for a folder resource
pub fn folder_json(id: &str, name: &str, parent: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "mimeType": "application/vnd.google-apps.folder",
        "parents": [parent],
        "webViewLink": format!("https://drive.google.com/drive/folders/{id}"),
        "trashed": false
    })
}

/// Mounts a single-page children listing for `parent`
pub async fn mount_children(server: &MockServer, parent: &str, files: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param(
            "q",
            format!("'{parent}' in parents and trashed=false"),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": files })))
        .mount(server)
        .await;
}

/// Mounts a metadata lookup for a single object
pub async fn mount_get(server: &MockServer, id: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/drive/v3/files/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Body of a Drive error response
pub fn error_json(code: u16, message: &str) -> Value {
    json!({ "error": { "code": code, "message": message } })
}
