//! Google Drive v3 API client
//!
//! Provides a typed HTTP client for the Drive metadata endpoints. Handles
//! bearer authentication (with a single refresh-and-retry on 401), status
//! mapping into [`DriveError`], pagination, and conversion of the wire
//! `File` resource into the domain [`RemoteObject`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gdrive_api::auth::StaticCredentials;
//! use gdrive_api::client::DriveClient;
//! use gdrive_core::domain::ObjectId;
//!
//! # async fn example() -> Result<(), gdrive_core::domain::DriveError> {
//! let client = DriveClient::new(Arc::new(StaticCredentials::new("access-token")));
//! for child in client.list_children(&ObjectId::root(), false).await? {
//!     println!("{}", child.name);
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use gdrive_core::config::Config;
use gdrive_core::domain::{
    DriveError, ObjectId, PermissionEntry, RemoteObject, Visibility, FOLDER_MIME_TYPE,
    PUBLIC_PERMISSION_ID,
};
use gdrive_core::ports::ICredentialProvider;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::json;
use tracing::{debug, info, warn};

/// Base URL for Drive API v3 metadata calls
const DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Base URL for Drive API v3 upload calls
const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3";

/// Default timeout for metadata calls
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default page size for listings (the store's maximum)
const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Fields requested for every `File` resource
pub(crate) const FILE_FIELDS: &str = "id,name,mimeType,size,createdTime,modifiedTime,parents,\
permissions(id,type,role),webContentLink,webViewLink,exportLinks,originalFilename,trashed";

// ============================================================================
// Drive API response types
// ============================================================================

/// A `File` resource as returned by Drive v3
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileResource {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    mime_type: String,
    /// int64 values are transported as JSON strings
    #[serde(default, deserialize_with = "deserialize_size")]
    size: Option<u64>,
    created_time: Option<String>,
    modified_time: Option<String>,
    #[serde(default)]
    parents: Vec<String>,
    #[serde(default)]
    permissions: Vec<PermissionResource>,
    web_content_link: Option<String>,
    web_view_link: Option<String>,
    #[serde(default)]
    export_links: BTreeMap<String, String>,
    original_filename: Option<String>,
    #[serde(default)]
    trashed: bool,
}

/// Permission entry attached to a `File` resource
#[derive(Debug, Deserialize)]
struct PermissionResource {
    id: String,
}

/// One page of a `files.list` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<FileResource>,
    next_page_token: Option<String>,
}

/// Error envelope: `{"error": {"code": 404, "message": "..."}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn deserialize_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

// ============================================================================
// FileResource -> RemoteObject conversion
// ============================================================================

impl FileResource {
    /// Converts the wire resource into the domain object
    ///
    /// Fails with [`DriveError::InvalidResponse`] when the store returns an
    /// ID that is not a valid [`ObjectId`].
    pub(crate) fn into_remote_object(self) -> Result<RemoteObject, DriveError> {
        let id = parse_id(self.id)?;
        let parent_ids = self
            .parents
            .into_iter()
            .map(parse_id)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RemoteObject {
            id,
            is_folder: self.mime_type == FOLDER_MIME_TYPE,
            name: self.name,
            mime_type: self.mime_type,
            parent_ids,
            size: self.size,
            created_at: self.created_time,
            modified_at: self.modified_time,
            download_link: self.web_content_link,
            web_view_link: self.web_view_link,
            export_links: self.export_links,
            original_filename: self.original_filename,
            permissions: self
                .permissions
                .into_iter()
                .map(|p| PermissionEntry::from_id(p.id))
                .collect(),
            trashed: self.trashed,
        })
    }
}

fn parse_id(raw: String) -> Result<ObjectId, DriveError> {
    ObjectId::new(raw).map_err(|e| DriveError::InvalidResponse(e.to_string()))
}

// ============================================================================
// Status mapping
// ============================================================================

/// Maps a transport failure into [`DriveError::Network`]
pub(crate) fn network_error(error: reqwest::Error) -> DriveError {
    if error.is_timeout() {
        DriveError::Network(format!("request timed out: {error}"))
    } else {
        DriveError::Network(error.to_string())
    }
}

/// Extracts `error.message` from a JSON error body, or returns the raw body
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| body.trim().to_string())
}

/// Passes a successful response through; maps any other status
///
/// `subject` names what was being addressed, for the NotFound message.
pub(crate) async fn check_status(response: Response, subject: &str) -> Result<Response, DriveError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);
    debug!(status = status.as_u16(), %message, "Drive API returned error status");

    Err(match status {
        StatusCode::UNAUTHORIZED => DriveError::Auth(message),
        StatusCode::NOT_FOUND => DriveError::NotFound(subject.to_string()),
        _ => DriveError::Api {
            status: status.as_u16(),
            message,
        },
    })
}

// ============================================================================
// DriveClient
// ============================================================================

/// HTTP client for Google Drive v3 calls
///
/// Wraps `reqwest::Client` with bearer authentication obtained from an
/// [`ICredentialProvider`] and base URL construction for the metadata and
/// upload endpoints. Every call runs to completion before returning, so a
/// single client never has more than one request in flight per caller.
pub struct DriveClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for metadata requests
    base_url: String,
    /// Base URL for upload session initiation
    upload_url: String,
    /// Source of bearer tokens
    credentials: Arc<dyn ICredentialProvider>,
    /// Timeout applied to metadata calls; transfers are unbounded
    request_timeout: Duration,
    /// Page size for listings
    page_size: u32,
}

impl DriveClient {
    /// Creates a new DriveClient against the public Drive endpoints
    pub fn new(credentials: Arc<dyn ICredentialProvider>) -> Self {
        Self::with_base_urls(credentials, DRIVE_BASE_URL, DRIVE_UPLOAD_URL)
    }

    /// Creates a new DriveClient with custom base URLs (useful for testing)
    pub fn with_base_urls(
        credentials: Arc<dyn ICredentialProvider>,
        base_url: impl Into<String>,
        upload_url: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            upload_url: upload_url.into().trim_end_matches('/').to_string(),
            credentials,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Creates a DriveClient from the `api` section of the configuration
    pub fn from_config(config: &Config, credentials: Arc<dyn ICredentialProvider>) -> Self {
        Self::with_base_urls(credentials, &config.api.base_url, &config.api.upload_url)
            .with_request_timeout(config.request_timeout())
            .with_page_size(config.api.page_size)
    }

    /// Sets the timeout applied to metadata calls
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the listing page size
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Returns the base URL for metadata requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the base URL for upload requests
    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    /// Returns the configured metadata timeout
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub(crate) fn http_client(&self) -> &Client {
        &self.client
    }

    pub(crate) fn credentials(&self) -> &dyn ICredentialProvider {
        self.credentials.as_ref()
    }

    /// Sends a request, refreshing credentials and retrying once on 401
    ///
    /// `build` is invoked once per attempt with the HTTP client and the
    /// current bearer token. A second 401 is surfaced as [`DriveError::Auth`].
    pub(crate) async fn send_authorized<F>(&self, build: F) -> Result<Response, DriveError>
    where
        F: Fn(&Client, &str) -> RequestBuilder,
    {
        let token = self.credentials.access_token().await?;
        let response = build(&self.client, &token)
            .send()
            .await
            .map_err(network_error)?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        warn!("Access token rejected, refreshing credentials");
        let token = self.credentials.refresh().await?;
        let response = build(&self.client, &token)
            .send()
            .await
            .map_err(network_error)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::Auth(error_message(&body)));
        }
        Ok(response)
    }

    /// Sends a metadata call and returns the checked response
    async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
        subject: &str,
    ) -> Result<Response, DriveError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "Drive API request");

        let response = self
            .send_authorized(|client, token| {
                let request = client
                    .request(method.clone(), &url)
                    .bearer_auth(token)
                    .timeout(self.request_timeout)
                    .query(query);
                match &body {
                    Some(body) => request.json(body),
                    None => request,
                }
            })
            .await?;

        check_status(response, subject).await
    }

    /// Sends a metadata call and parses the JSON body
    async fn call_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
        subject: &str,
    ) -> Result<T, DriveError> {
        let response = self.call(method, path, query, body, subject).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| DriveError::InvalidResponse(format!("{subject}: {e}")))
    }

    /// Sends a metadata call that returns a single `File` resource
    async fn call_file(
        &self,
        method: Method,
        path: &str,
        mut query: Vec<(&str, String)>,
        body: Option<serde_json::Value>,
        subject: &str,
    ) -> Result<RemoteObject, DriveError> {
        query.push(("fields", FILE_FIELDS.to_string()));
        let resource: FileResource = self.call_json(method, path, &query, body, subject).await?;
        resource.into_remote_object()
    }

    // ========================================================================
    // Listing
    // ========================================================================

    /// Runs a `files.list` query, following `nextPageToken` to the end
    pub async fn list_query(&self, q: &str) -> Result<Vec<RemoteObject>, DriveError> {
        let mut objects = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("q", q.to_string()),
                ("fields", format!("nextPageToken,files({FILE_FIELDS})")),
                ("pageSize", self.page_size.to_string()),
            ];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            let page: FileList = self
                .call_json(Method::GET, "/files", &query, None, q)
                .await?;
            for resource in page.files {
                objects.push(resource.into_remote_object()?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(query = q, count = objects.len(), "Listed objects");
        Ok(objects)
    }

    /// Lists the children of `parent` whose trashed flag equals `include_trashed`
    pub async fn list_children(
        &self,
        parent: &ObjectId,
        include_trashed: bool,
    ) -> Result<Vec<RemoteObject>, DriveError> {
        self.list_query(&format!("'{parent}' in parents and trashed={include_trashed}"))
            .await
    }

    /// Lists every trashed object
    pub async fn list_trash(&self) -> Result<Vec<RemoteObject>, DriveError> {
        self.list_query("trashed=true").await
    }

    // ========================================================================
    // Single-object operations
    // ========================================================================

    /// Retrieves metadata for a single object
    pub async fn get_object(&self, id: &ObjectId) -> Result<RemoteObject, DriveError> {
        self.call_file(
            Method::GET,
            &format!("/files/{id}"),
            Vec::new(),
            None,
            &format!("object '{id}'"),
        )
        .await
    }

    /// Creates a folder under `parent`
    pub async fn create_folder(
        &self,
        name: &str,
        parent: &ObjectId,
    ) -> Result<RemoteObject, DriveError> {
        info!(name, parent = %parent, "Creating folder");
        self.call_file(
            Method::POST,
            "/files",
            Vec::new(),
            Some(json!({
                "name": name,
                "mimeType": FOLDER_MIME_TYPE,
                "parents": [parent.as_str()],
            })),
            &format!("parent folder '{parent}'"),
        )
        .await
    }

    /// Adds `add_parent` and removes `remove_parents` in a single update
    pub async fn set_parent(
        &self,
        id: &ObjectId,
        add_parent: &ObjectId,
        remove_parents: &[ObjectId],
    ) -> Result<RemoteObject, DriveError> {
        let remove = remove_parents
            .iter()
            .map(ObjectId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        info!(id = %id, add = %add_parent, remove = %remove, "Reparenting object");

        let mut query = vec![("addParents", add_parent.to_string())];
        if !remove.is_empty() {
            query.push(("removeParents", remove));
        }
        self.call_file(
            Method::PATCH,
            &format!("/files/{id}"),
            query,
            Some(json!({})),
            &format!("object '{id}'"),
        )
        .await
    }

    /// Copies an object into `destination_parent`
    pub async fn copy(
        &self,
        id: &ObjectId,
        destination_parent: &ObjectId,
    ) -> Result<RemoteObject, DriveError> {
        info!(id = %id, destination = %destination_parent, "Copying object");
        self.call_file(
            Method::POST,
            &format!("/files/{id}/copy"),
            Vec::new(),
            Some(json!({ "parents": [destination_parent.as_str()] })),
            &format!("object '{id}'"),
        )
        .await
    }

    /// Renames an object
    pub async fn rename(&self, id: &ObjectId, new_name: &str) -> Result<RemoteObject, DriveError> {
        info!(id = %id, new_name, "Renaming object");
        self.call_file(
            Method::PATCH,
            &format!("/files/{id}"),
            Vec::new(),
            Some(json!({ "name": new_name })),
            &format!("object '{id}'"),
        )
        .await
    }

    /// Sets the trashed flag of an object
    pub async fn set_trashed(
        &self,
        id: &ObjectId,
        trashed: bool,
    ) -> Result<RemoteObject, DriveError> {
        info!(id = %id, trashed, "Updating trashed flag");
        self.call_file(
            Method::PATCH,
            &format!("/files/{id}"),
            Vec::new(),
            Some(json!({ "trashed": trashed })),
            &format!("object '{id}'"),
        )
        .await
    }

    /// Permanently deletes an object
    ///
    /// The root sentinel is refused before any request is made.
    pub async fn delete(&self, id: &ObjectId) -> Result<(), DriveError> {
        if id.is_root() {
            return Err(DriveError::RootProtected("delete".to_string()));
        }
        info!(id = %id, "Deleting object permanently");
        self.call(
            Method::DELETE,
            &format!("/files/{id}"),
            &[],
            None,
            &format!("object '{id}'"),
        )
        .await?;
        Ok(())
    }

    /// Permanently deletes every trashed object
    pub async fn empty_trash(&self) -> Result<(), DriveError> {
        info!("Emptying trash");
        self.call(Method::DELETE, "/files/trash", &[], None, "trash")
            .await?;
        Ok(())
    }

    /// Grants (`Public`) or revokes (`Private`) read access for anyone with the link
    pub async fn set_permission(
        &self,
        id: &ObjectId,
        visibility: Visibility,
    ) -> Result<(), DriveError> {
        let subject = format!("object '{id}'");
        match visibility {
            Visibility::Public => {
                info!(id = %id, "Granting public read access");
                self.call(
                    Method::POST,
                    &format!("/files/{id}/permissions"),
                    &[],
                    Some(json!({ "role": "reader", "type": "anyone" })),
                    &subject,
                )
                .await?;
            }
            Visibility::Private => {
                info!(id = %id, "Revoking public access");
                let result = self
                    .call(
                        Method::DELETE,
                        &format!("/files/{id}/permissions/{PUBLIC_PERMISSION_ID}"),
                        &[],
                        None,
                        &subject,
                    )
                    .await;
                match result {
                    Ok(_) => {}
                    // No public permission to revoke
                    Err(DriveError::NotFound(_)) => {
                        debug!(id = %id, "Object was not public");
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(())
    }
}
