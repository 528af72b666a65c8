//! Upload operations for Google Drive v3
//!
//! Every upload is a two-step resumable session:
//! - [`create_upload_session`] - announces name, parent and size, and
//!   receives a session URL in the `Location` header
//! - [`upload_to_session`] - streams the file body with a single PUT,
//!   reporting progress as chunks are handed to the transport
//!
//! [`upload_file`] combines the two for a local path.
//!
//! ## Drive API References
//!
//! - [Resumable upload](https://developers.google.com/drive/api/guides/manage-uploads#resumable)

use std::path::Path;

use futures_util::StreamExt;
use gdrive_core::domain::{DriveError, ObjectId, ProgressCallback, ProgressTracker, RemoteObject};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use reqwest::{Body, StatusCode};
use serde_json::json;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::client::{error_message, network_error, DriveClient, FileResource, FILE_FIELDS};

/// Content type announced for uploaded bytes; the store sniffs the real type
const UPLOAD_CONTENT_TYPE: &str = "application/octet-stream";

/// An initiated resumable upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    /// Opaque session URL returned by the store
    pub session_url: String,
    /// Folder the object will be created in
    pub parent_id: ObjectId,
    /// Name the object will be created with
    pub name: String,
    /// Number of bytes announced at initiation
    pub size: u64,
}

// ============================================================================
// Session initiation
// ============================================================================

/// Creates a resumable upload session for `name` under `parent`
///
/// Makes `POST {upload_url}/files?uploadType=resumable` with the object
/// metadata as JSON and the announced length in `X-Upload-Content-Length`.
///
/// # Errors
/// [`DriveError::UploadSession`] if the store answers with anything other
/// than 200 or omits a usable `Location` header.
pub async fn create_upload_session(
    client: &DriveClient,
    parent: &ObjectId,
    name: &str,
    size: u64,
) -> Result<UploadSession, DriveError> {
    let url = format!("{}/files", client.upload_url());
    let metadata = json!({ "name": name, "parents": [parent.as_str()] });
    debug!(name, parent = %parent, size, "Creating upload session");

    let response = client
        .send_authorized(|http, token| {
            http.post(&url)
                .bearer_auth(token)
                .timeout(client.request_timeout())
                .query(&[("uploadType", "resumable"), ("fields", FILE_FIELDS)])
                .header("X-Upload-Content-Type", UPLOAD_CONTENT_TYPE)
                .header("X-Upload-Content-Length", size.to_string())
                .json(&metadata)
        })
        .await?;

    let status = response.status();
    if status != StatusCode::OK {
        let body = response.text().await.unwrap_or_default();
        return Err(DriveError::UploadSession(format!(
            "unexpected status {} when creating session: {}",
            status.as_u16(),
            body.trim()
        )));
    }

    let session_url = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| url::Url::parse(v).is_ok())
        .map(str::to_string)
        .ok_or_else(|| {
            DriveError::UploadSession("response did not carry a session URL".to_string())
        })?;

    debug!("Upload session created");
    Ok(UploadSession {
        session_url,
        parent_id: parent.clone(),
        name: name.to_string(),
        size,
    })
}

// ============================================================================
// Streaming PUT
// ============================================================================

/// Streams `source` into an upload session with a single PUT
///
/// The file is read in chunks and handed to the transport as a stream; the
/// progress callback fires once per chunk. No timeout is applied and the
/// request is not retried on 401 since the body cannot be replayed.
pub async fn upload_to_session(
    client: &DriveClient,
    session: &UploadSession,
    source: &Path,
    progress: Option<ProgressCallback>,
) -> Result<RemoteObject, DriveError> {
    let file = tokio::fs::File::open(source)
        .await
        .map_err(|e| DriveError::LocalFilesystem(format!("{}: {e}", source.display())))?;

    let mut tracker = ProgressTracker::new(Some(session.size), progress);
    let stream = ReaderStream::new(file).map(move |chunk| {
        if let Ok(bytes) = &chunk {
            tracker.advance(bytes.len() as u64);
        }
        chunk
    });

    let token = client.credentials().access_token().await?;
    let response = client
        .http_client()
        .put(&session.session_url)
        .bearer_auth(token)
        .header(CONTENT_LENGTH, session.size)
        .header(CONTENT_TYPE, UPLOAD_CONTENT_TYPE)
        .body(Body::wrap_stream(stream))
        .send()
        .await
        .map_err(network_error)?;

    // The body has been consumed, so a rejected token is reported, not retried
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        return Err(match status {
            StatusCode::UNAUTHORIZED => DriveError::Auth(message),
            _ => DriveError::Api {
                status: status.as_u16(),
                message,
            },
        });
    }

    let resource: FileResource = response
        .json()
        .await
        .map_err(|e| DriveError::InvalidResponse(format!("upload response: {e}")))?;
    resource.into_remote_object()
}

/// Uploads a local file as `name` under `parent`
///
/// # Returns
/// The created object as reported by the store
pub async fn upload_file(
    client: &DriveClient,
    source: &Path,
    parent: &ObjectId,
    name: &str,
    progress: Option<ProgressCallback>,
) -> Result<RemoteObject, DriveError> {
    let size = tokio::fs::metadata(source)
        .await
        .map_err(|e| DriveError::LocalFilesystem(format!("{}: {e}", source.display())))?
        .len();

    info!(source = %source.display(), name, size, "Uploading file");
    let session = create_upload_session(client, parent, name, size).await?;
    let object = upload_to_session(client, &session, source, progress).await?;
    info!(id = %object.id, name = %object.name, "Upload complete");
    Ok(object)
}
