//! DriveProvider - IRemoteStore implementation for Google Drive v3
//!
//! Wraps the [`DriveClient`] and delegates to the client, upload, and
//! download modules to fulfil the [`IRemoteStore`] port contract.
//!
//! ## Design Notes
//!
//! - Authentication is handled by the [`ICredentialProvider`] the client
//!   was built with; this provider focuses on object operations.
//! - The provider holds no state besides the client, so it can be shared
//!   freely behind a reference.
//!
//! [`ICredentialProvider`]: gdrive_core::ports::ICredentialProvider

use std::path::Path;

use gdrive_core::domain::{DriveError, ObjectId, ProgressCallback, RemoteObject, Visibility};
use gdrive_core::ports::{DownloadSource, IRemoteStore};

use crate::client::DriveClient;
use crate::download;
use crate::upload;

/// Google Drive implementation of [`IRemoteStore`]
pub struct DriveProvider {
    client: DriveClient,
}

impl DriveProvider {
    /// Creates a provider backed by `client`
    pub fn new(client: DriveClient) -> Self {
        Self { client }
    }

    /// Returns the underlying client
    pub fn client(&self) -> &DriveClient {
        &self.client
    }
}

#[async_trait::async_trait]
impl IRemoteStore for DriveProvider {
    async fn list_children(
        &self,
        parent: &ObjectId,
        include_trashed: bool,
    ) -> Result<Vec<RemoteObject>, DriveError> {
        self.client.list_children(parent, include_trashed).await
    }

    async fn list_trash(&self) -> Result<Vec<RemoteObject>, DriveError> {
        self.client.list_trash().await
    }

    async fn get_object(&self, id: &ObjectId) -> Result<RemoteObject, DriveError> {
        self.client.get_object(id).await
    }

    async fn create_folder(
        &self,
        name: &str,
        parent: &ObjectId,
    ) -> Result<RemoteObject, DriveError> {
        self.client.create_folder(name, parent).await
    }

    async fn set_parent(
        &self,
        id: &ObjectId,
        add_parent: &ObjectId,
        remove_parents: &[ObjectId],
    ) -> Result<RemoteObject, DriveError> {
        self.client.set_parent(id, add_parent, remove_parents).await
    }

    async fn copy(
        &self,
        id: &ObjectId,
        destination_parent: &ObjectId,
    ) -> Result<RemoteObject, DriveError> {
        self.client.copy(id, destination_parent).await
    }

    async fn rename(&self, id: &ObjectId, new_name: &str) -> Result<RemoteObject, DriveError> {
        self.client.rename(id, new_name).await
    }

    async fn set_trashed(
        &self,
        id: &ObjectId,
        trashed: bool,
    ) -> Result<RemoteObject, DriveError> {
        self.client.set_trashed(id, trashed).await
    }

    async fn delete(&self, id: &ObjectId) -> Result<(), DriveError> {
        self.client.delete(id).await
    }

    async fn empty_trash(&self) -> Result<(), DriveError> {
        self.client.empty_trash().await
    }

    async fn set_permission(
        &self,
        id: &ObjectId,
        visibility: Visibility,
    ) -> Result<(), DriveError> {
        self.client.set_permission(id, visibility).await
    }

    async fn upload_file(
        &self,
        source: &Path,
        parent: &ObjectId,
        name: &str,
        progress: Option<ProgressCallback>,
    ) -> Result<RemoteObject, DriveError> {
        upload::upload_file(&self.client, source, parent, name, progress).await
    }

    async fn download(
        &self,
        source: &DownloadSource,
        destination: &Path,
        declared_size: Option<u64>,
        progress: Option<ProgressCallback>,
    ) -> Result<u64, DriveError> {
        download::download_to_file(&self.client, source, destination, declared_size, progress)
            .await
    }
}
