//! Download operations for Google Drive v3
//!
//! Content is streamed into `<destination>.partial` and renamed into place
//! once the last chunk is flushed. A failed transfer removes the partial
//! file and leaves any existing destination untouched.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use gdrive_core::domain::{DriveError, ProgressCallback, ProgressTracker};
use gdrive_core::ports::DownloadSource;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::client::{check_status, network_error, DriveClient};

/// Suffix of the in-progress file next to the destination
const PARTIAL_SUFFIX: &str = ".partial";

/// Returns the path the transfer writes to before the final rename
pub fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

/// Streams `source` into `destination`
///
/// The total for progress reporting is `declared_size` when known, else
/// the response `Content-Length`. With neither, no progress is reported.
///
/// # Returns
/// The number of bytes written
pub async fn download_to_file(
    client: &DriveClient,
    source: &DownloadSource,
    destination: &Path,
    declared_size: Option<u64>,
    progress: Option<ProgressCallback>,
) -> Result<u64, DriveError> {
    let (url, subject) = match source {
        DownloadSource::Content(id) => (
            format!("{}/files/{id}", client.base_url()),
            format!("object '{id}'"),
        ),
        DownloadSource::Export { mime_type, url } => {
            (url.clone(), format!("export as '{mime_type}'"))
        }
    };
    let is_content = matches!(source, DownloadSource::Content(_));
    debug!(%url, destination = %destination.display(), "Starting download");

    let response = client
        .send_authorized(|http, token| {
            let request = http.get(&url).bearer_auth(token);
            if is_content {
                request.query(&[("alt", "media")])
            } else {
                request
            }
        })
        .await?;
    let response = check_status(response, &subject).await?;

    let total = declared_size.or_else(|| response.content_length());
    let mut tracker = ProgressTracker::new(total, progress);

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let partial = partial_path(destination);
    let mut file = tokio::fs::File::create(&partial).await?;

    let mut stream = response.bytes_stream();
    let result: Result<(), DriveError> = async {
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(network_error)?;
            file.write_all(&chunk).await?;
            tracker.advance(chunk.len() as u64);
        }
        file.flush().await?;
        Ok(())
    }
    .await;
    drop(file);

    if let Err(e) = result {
        warn!(partial = %partial.display(), error = %e, "Download failed, removing partial file");
        if let Err(remove_err) = tokio::fs::remove_file(&partial).await {
            debug!(error = %remove_err, "Could not remove partial file");
        }
        return Err(e);
    }

    tokio::fs::rename(&partial, destination).await?;
    let written = tracker.transferred();
    info!(destination = %destination.display(), bytes = written, "Download complete");
    Ok(written)
}
