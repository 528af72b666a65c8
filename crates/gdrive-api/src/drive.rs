//! Path-addressed operations over an [`IRemoteStore`]
//!
//! [`Drive`] is what the command layer talks to. It resolves user paths
//! through the [`PathResolver`], refuses destructive operations on the
//! root before any request is made, and clears the metadata cache after
//! every mutation attempt, whether it succeeded or not.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use gdrive_core::domain::newtypes::validate_name;
use gdrive_core::domain::{
    DriveError, ObjectId, ProgressCallback, RemoteObject, VirtualPath, Visibility,
};
use gdrive_core::ports::{DownloadSource, IRemoteStore};
use tracing::{debug, info};

use crate::export::{self, ExportFormat};
use crate::local;
use crate::resolver::PathResolver;

/// Browser URL used when the store reports no web view link
const WEB_VIEW_FALLBACK: &str = "https://drive.google.com/open?id=";

/// How [`Drive::remove`] disposes of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveMode {
    /// Move to the trash; reversible with [`Drive::restore`]
    Trash,
    /// Delete permanently
    Permanent,
}

/// Links returned after sharing an object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLinks {
    pub object: RemoteObject,
    pub web_view_link: Option<String>,
    pub download_link: Option<String>,
}

/// What a download produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Bytes were written to `path`
    Saved { path: PathBuf, bytes: u64 },
    /// The object has no downloadable form; open it in a browser instead
    WebView { url: String },
}

/// Objects touched by an upload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSummary {
    /// Remote folders created or reused for a directory upload
    pub folders: Vec<RemoteObject>,
    pub files: Vec<RemoteObject>,
}

/// Fails with [`DriveError::RootProtected`] if `path` is the root
fn guard_root(path: &VirtualPath, operation: &str) -> Result<(), DriveError> {
    if path.is_root() {
        return Err(DriveError::RootProtected(operation.to_string()));
    }
    Ok(())
}

/// True iff the object carries bytes of its own rather than export targets
fn has_direct_content(object: &RemoteObject) -> bool {
    object.download_link.is_some()
        || (object.export_links.is_empty() && object.original_filename.is_some())
}

/// Path-addressed facade over a remote store
pub struct Drive<S> {
    store: S,
    resolver: PathResolver,
}

impl<S: IRemoteStore> Drive<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            resolver: PathResolver::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Clears the cache and passes `result` through
    fn settle<T>(&mut self, result: Result<T, DriveError>) -> Result<T, DriveError> {
        self.resolver.invalidate();
        result
    }

    /// Resolves `path` to the object it names
    pub async fn resolve(&mut self, path: &VirtualPath) -> Result<RemoteObject, DriveError> {
        self.resolver.resolve(&self.store, path).await
    }

    // ========================================================================
    // Read operations
    // ========================================================================

    /// Lists the folder at `path`, or the single object if it is not a folder
    pub async fn list(&mut self, path: &VirtualPath) -> Result<Vec<RemoteObject>, DriveError> {
        let object = self.resolve(path).await?;
        if !object.is_folder {
            return Ok(vec![object]);
        }
        self.resolver.children(&self.store, &object.id, false).await
    }

    /// Lists every trashed object
    pub async fn list_trash(&mut self) -> Result<Vec<RemoteObject>, DriveError> {
        self.store.list_trash().await
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Trashes or deletes the object at `path`
    pub async fn remove(
        &mut self,
        path: &VirtualPath,
        mode: RemoveMode,
    ) -> Result<RemoteObject, DriveError> {
        guard_root(path, "delete")?;
        let object = self.resolve(path).await?;

        let result = match mode {
            RemoveMode::Trash => self.store.set_trashed(&object.id, true).await,
            RemoveMode::Permanent => self.store.delete(&object.id).await.map(|()| object),
        };
        self.settle(result)
    }

    /// Makes the object readable by anyone with the link
    pub async fn share(&mut self, path: &VirtualPath) -> Result<ShareLinks, DriveError> {
        guard_root(path, "share")?;
        let object = self.resolve(path).await?;

        let result = self
            .store
            .set_permission(&object.id, Visibility::Public)
            .await;
        self.settle(result)?;

        let object = self.store.get_object(&object.id).await?;
        Ok(ShareLinks {
            web_view_link: object.web_view_link.clone(),
            download_link: object.download_link.clone(),
            object,
        })
    }

    /// Revokes access for anyone with the link
    pub async fn make_private(&mut self, path: &VirtualPath) -> Result<RemoteObject, DriveError> {
        guard_root(path, "make private")?;
        let object = self.resolve(path).await?;

        let result = self
            .store
            .set_permission(&object.id, Visibility::Private)
            .await;
        self.settle(result)?;
        self.store.get_object(&object.id).await
    }

    /// Renames the object at `path` in place
    pub async fn rename(
        &mut self,
        path: &VirtualPath,
        new_name: &str,
    ) -> Result<RemoteObject, DriveError> {
        guard_root(path, "rename")?;
        validate_name(new_name)?;
        let object = self.resolve(path).await?;

        let result = self.store.rename(&object.id, new_name).await;
        self.settle(result)
    }

    /// Copies the file at `source` into the folder at `destination`
    pub async fn copy(
        &mut self,
        source: &VirtualPath,
        destination: &VirtualPath,
    ) -> Result<RemoteObject, DriveError> {
        guard_root(source, "copy")?;
        let object = self.resolve(source).await?;
        if object.is_folder {
            return Err(DriveError::InvalidArgument(format!(
                "'{source}' is a folder; only files can be copied"
            )));
        }
        let target = self
            .resolver
            .resolve_folder(&self.store, destination)
            .await?;

        let result = self.store.copy(&object.id, &target.id).await;
        self.settle(result)
    }

    /// Moves the object at `source` into the folder at `destination`
    ///
    /// Every previous parent is removed, so the object ends up with exactly
    /// one parent. A destination at or below `source` is refused before any
    /// store call. Descendants reached through another parent are only
    /// caught by the store, which answers with an API error.
    pub async fn move_to(
        &mut self,
        source: &VirtualPath,
        destination: &VirtualPath,
    ) -> Result<RemoteObject, DriveError> {
        guard_root(source, "move")?;
        if destination.segments().starts_with(source.segments()) {
            return Err(DriveError::InvalidArgument(format!(
                "cannot move '{source}' into itself or one of its subfolders"
            )));
        }
        let object = self.resolve(source).await?;
        let target = self
            .resolver
            .resolve_folder(&self.store, destination)
            .await?;
        if target.id == object.id {
            return Err(DriveError::InvalidArgument(format!(
                "cannot move '{source}' into itself"
            )));
        }

        let result = self
            .store
            .set_parent(&object.id, &target.id, &object.parent_ids)
            .await;
        self.settle(result)
    }

    /// Permanently deletes everything in the trash
    pub async fn empty_trash(&mut self) -> Result<(), DriveError> {
        let result = self.store.empty_trash().await;
        self.settle(result)
    }

    /// Restores a trashed object by name (first match) or by ID
    pub async fn restore(&mut self, name_or_id: &str) -> Result<RemoteObject, DriveError> {
        let trash = self.store.list_trash().await?;
        let target = match trash.iter().find(|o| o.name == name_or_id) {
            Some(object) => object.id.clone(),
            None => ObjectId::new(name_or_id)
                .map_err(|_| DriveError::NotFound(format!("'{name_or_id}' in trash")))?,
        };
        debug!(target = %target, "Restoring from trash");

        let result = self.store.restore(&target).await;
        self.settle(result)
    }

    /// Creates the folder at `path`; the parent must already exist
    ///
    /// Fails with [`DriveError::InvalidArgument`] if the parent already has a
    /// child with the same name.
    pub async fn make_folder(&mut self, path: &VirtualPath) -> Result<RemoteObject, DriveError> {
        let name = path.file_name().ok_or_else(|| {
            DriveError::InvalidArgument("the root folder already exists".to_string())
        })?;
        let parent_path = path.parent().unwrap_or_else(VirtualPath::root);
        let parent = self
            .resolver
            .resolve_folder(&self.store, &parent_path)
            .await?;

        let siblings = self.resolver.children(&self.store, &parent.id, false).await?;
        if siblings.iter().any(|s| s.name == name) {
            return Err(DriveError::InvalidArgument(format!("'{path}' already exists")));
        }

        let result = self.store.create_folder(name, &parent.id).await;
        self.settle(result)
    }

    /// Creates every missing folder along `path` and returns the last one
    pub async fn ensure_folder(&mut self, path: &VirtualPath) -> Result<RemoteObject, DriveError> {
        let mut current = RemoteObject::root();
        let mut walked = VirtualPath::root();

        for segment in path.segments() {
            walked = walked.join(segment)?;
            current = self
                .ensure_child_folder(&current.id, segment, &walked)
                .await?;
        }
        Ok(current)
    }

    /// Returns the first folder named `name` under `parent`, creating it if absent
    async fn ensure_child_folder(
        &mut self,
        parent: &ObjectId,
        name: &str,
        path: &VirtualPath,
    ) -> Result<RemoteObject, DriveError> {
        let children = self.resolver.children(&self.store, parent, false).await?;
        match children.into_iter().find(|c| c.name == name) {
            Some(existing) if existing.is_folder => Ok(existing),
            Some(_) => Err(DriveError::NotAFolder(path.as_key())),
            None => {
                info!(path = %path, "Creating folder");
                let result = self.store.create_folder(name, parent).await;
                self.settle(result)
            }
        }
    }

    // ========================================================================
    // Transfers
    // ========================================================================

    /// Downloads the object at `path` to `destination`
    ///
    /// Regular files are streamed as-is. Native documents are exported in
    /// the format `choose_export` picks from the offered ones. Objects with
    /// neither yield [`DownloadOutcome::WebView`].
    pub async fn download<F>(
        &mut self,
        path: &VirtualPath,
        destination: &Path,
        choose_export: F,
        progress: Option<ProgressCallback>,
    ) -> Result<DownloadOutcome, DriveError>
    where
        F: FnOnce(&[ExportFormat]) -> Option<ExportFormat>,
    {
        let object = self.resolve(path).await?;
        if object.is_folder {
            return Err(DriveError::InvalidArgument(format!(
                "'{path}' is a folder; folder download is not supported"
            )));
        }

        if has_direct_content(&object) {
            let target = local::download_target(destination, &object.name).await;
            let bytes = self
                .store
                .download(
                    &DownloadSource::Content(object.id.clone()),
                    &target,
                    object.size,
                    progress,
                )
                .await?;
            return Ok(DownloadOutcome::Saved {
                path: target,
                bytes,
            });
        }

        let formats = export::formats_for(&object);
        if formats.is_empty() {
            let url = object
                .web_view_link
                .clone()
                .unwrap_or_else(|| format!("{WEB_VIEW_FALLBACK}{}", object.id));
            return Ok(DownloadOutcome::WebView { url });
        }

        let format = choose_export(&formats).ok_or_else(|| {
            DriveError::InvalidArgument(format!("no export format selected for '{path}'"))
        })?;
        let target = local::download_target(destination, &format.file_name(&object.name)).await;
        let source = DownloadSource::Export {
            mime_type: format.mime_type,
            url: format.url,
        };
        let bytes = self.store.download(&source, &target, None, progress).await?;
        Ok(DownloadOutcome::Saved {
            path: target,
            bytes,
        })
    }

    /// Uploads a local file or directory tree into the folder at `destination`
    ///
    /// `progress_for` is asked for a callback once per file, with the local
    /// path and its size.
    pub async fn upload(
        &mut self,
        source: &Path,
        destination: &VirtualPath,
        progress_for: &mut (dyn FnMut(&Path, u64) -> Option<ProgressCallback> + Send),
    ) -> Result<UploadSummary, DriveError> {
        let metadata = tokio::fs::metadata(source).await.map_err(|e| {
            DriveError::LocalFilesystem(format!("{}: {e}", source.display()))
        })?;
        let name = local::object_name(source).await?;
        validate_name(&name)?;
        let parent = self
            .resolver
            .resolve_folder(&self.store, destination)
            .await?;

        let mut summary = UploadSummary::default();

        if !metadata.is_dir() {
            let progress = progress_for(source, metadata.len());
            let result = self
                .store
                .upload_file(source, &parent.id, &name, progress)
                .await;
            summary.files.push(self.settle(result)?);
            return Ok(summary);
        }

        let base_path = destination.join(&name)?;
        let base = self.ensure_child_folder(&parent.id, &name, &base_path).await?;
        let mut folder_ids: HashMap<PathBuf, ObjectId> = HashMap::new();
        folder_ids.insert(PathBuf::new(), base.id.clone());
        summary.folders.push(base);

        for entry in local::walk(source).await? {
            let parent_dir = entry
                .relative
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            let parent_id = folder_ids.get(&parent_dir).cloned().ok_or_else(|| {
                DriveError::LocalFilesystem(format!(
                    "{}: parent directory was not uploaded",
                    entry.relative.display()
                ))
            })?;
            let entry_name = entry
                .relative
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            if entry.is_dir {
                let remote_path = entry
                    .relative
                    .components()
                    .try_fold(base_path.clone(), |acc, c| {
                        acc.join(&c.as_os_str().to_string_lossy())
                    })?;
                let folder = self
                    .ensure_child_folder(&parent_id, &entry_name, &remote_path)
                    .await?;
                folder_ids.insert(entry.relative.clone(), folder.id.clone());
                summary.folders.push(folder);
            } else {
                let local_path = source.join(&entry.relative);
                let progress = progress_for(&local_path, entry.size);
                let result = self
                    .store
                    .upload_file(&local_path, &parent_id, &entry_name, progress)
                    .await;
                summary.files.push(self.settle(result)?);
            }
        }

        info!(
            files = summary.files.len(),
            folders = summary.folders.len(),
            "Directory upload complete"
        );
        Ok(summary)
    }
}
