//! Remote store port (driven/secondary port)
//!
//! This module defines the typed operations the path resolver and the
//! command layer need from the object store. The primary implementation
//! targets Google Drive v3 over HTTP; tests use in-memory stores.
//!
//! ## Design Notes
//!
//! - Uses [`DriveError`] rather than `anyhow` because callers react
//!   differently to "not found" and to transient failures.
//! - Transfer operations take an optional [`ProgressCallback`] that the
//!   implementation invokes inline from its streaming loop.
//! - Implementations retry only on credential expiry (refresh, then one
//!   retry); every other failure is returned immediately.

use std::path::Path;

use crate::domain::errors::DriveError;
use crate::domain::newtypes::ObjectId;
use crate::domain::object::{RemoteObject, Visibility};
use crate::domain::progress::ProgressCallback;

/// Where the bytes of a download come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadSource {
    /// Direct content of a regular file
    Content(ObjectId),
    /// Converted export of a native document
    Export {
        /// Target mime type
        mime_type: String,
        /// Export URL as reported in the object's export links
        url: String,
    },
}

/// Port trait for remote object store operations
#[async_trait::async_trait]
pub trait IRemoteStore: Send + Sync {
    /// Lists the children of `parent` in store order
    async fn list_children(
        &self,
        parent: &ObjectId,
        include_trashed: bool,
    ) -> Result<Vec<RemoteObject>, DriveError>;

    /// Lists every trashed object
    async fn list_trash(&self) -> Result<Vec<RemoteObject>, DriveError>;

    /// Retrieves metadata for a single object
    ///
    /// Fails with [`DriveError::NotFound`] if the ID no longer exists.
    async fn get_object(&self, id: &ObjectId) -> Result<RemoteObject, DriveError>;

    /// Creates a folder named `name` with exactly one parent
    async fn create_folder(
        &self,
        name: &str,
        parent: &ObjectId,
    ) -> Result<RemoteObject, DriveError>;

    /// Reparents an object: adds `add_parent`, removes `remove_parents`
    async fn set_parent(
        &self,
        id: &ObjectId,
        add_parent: &ObjectId,
        remove_parents: &[ObjectId],
    ) -> Result<RemoteObject, DriveError>;

    /// Copies an object into `destination_parent`
    async fn copy(
        &self,
        id: &ObjectId,
        destination_parent: &ObjectId,
    ) -> Result<RemoteObject, DriveError>;

    /// Renames an object
    async fn rename(&self, id: &ObjectId, new_name: &str) -> Result<RemoteObject, DriveError>;

    /// Moves an object to or from the trash
    async fn set_trashed(&self, id: &ObjectId, trashed: bool)
        -> Result<RemoteObject, DriveError>;

    /// Restores a trashed object
    async fn restore(&self, id: &ObjectId) -> Result<RemoteObject, DriveError> {
        self.set_trashed(id, false).await
    }

    /// Permanently deletes an object; refused for the root sentinel
    async fn delete(&self, id: &ObjectId) -> Result<(), DriveError>;

    /// Permanently deletes everything in the trash
    async fn empty_trash(&self) -> Result<(), DriveError>;

    /// Grants or revokes access for anyone with the link
    async fn set_permission(&self, id: &ObjectId, visibility: Visibility)
        -> Result<(), DriveError>;

    /// Uploads a local file as `name` under `parent` in a single session
    async fn upload_file(
        &self,
        source: &Path,
        parent: &ObjectId,
        name: &str,
        progress: Option<ProgressCallback>,
    ) -> Result<RemoteObject, DriveError>;

    /// Streams `source` into `destination`, returning the bytes written
    async fn download(
        &self,
        source: &DownloadSource,
        destination: &Path,
        declared_size: Option<u64>,
        progress: Option<ProgressCallback>,
    ) -> Result<u64, DriveError>;
}
