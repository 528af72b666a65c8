//! Path resolution over the ID-addressed object graph
//!
//! Translates a [`VirtualPath`] into the object it names by walking from
//! the root one segment at a time. At each level the parent's children are
//! listed and the first child whose name matches exactly is taken; sibling
//! duplicates after it are unreachable by path.
//!
//! Every intermediate result is remembered in the [`MetadataCache`], so
//! resolving `/a/b/c` after `/a/b/d` costs one listing instead of three.

use gdrive_core::domain::{DriveError, ObjectId, RemoteObject, VirtualPath};
use gdrive_core::ports::IRemoteStore;
use tracing::{debug, trace};

use crate::cache::{CachedLookup, MetadataCache};

/// Resolves virtual paths against an [`IRemoteStore`]
#[derive(Debug, Default)]
pub struct PathResolver {
    cache: MetadataCache,
}

impl PathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the cache
    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// Drops all cached lookups; called after every mutation
    pub fn invalidate(&mut self) {
        if !self.cache.is_empty() {
            debug!(entries = self.cache.len(), "Invalidating metadata cache");
        }
        self.cache.clear();
    }

    /// Resolves `path` to the object it names
    ///
    /// The root resolves to [`RemoteObject::root`] without a network call.
    ///
    /// # Errors
    /// - [`DriveError::NotFound`] with the first sub-path that has no match
    /// - [`DriveError::NotAFolder`] with the first sub-path that resolved to
    ///   a non-folder while segments remained
    pub async fn resolve<S>(
        &mut self,
        store: &S,
        path: &VirtualPath,
    ) -> Result<RemoteObject, DriveError>
    where
        S: IRemoteStore + ?Sized,
    {
        let mut current = RemoteObject::root();

        for (depth, segment) in path.segments().iter().enumerate() {
            if !current.is_folder {
                return Err(DriveError::NotAFolder(path.prefix_key(depth)));
            }

            let key = path.prefix_key(depth + 1);
            match self.cache.path(&key) {
                Some(CachedLookup::Found(object)) => {
                    trace!(%key, "Path cache hit");
                    current = object.clone();
                    continue;
                }
                Some(CachedLookup::Missing) => {
                    trace!(%key, "Path cache hit (missing)");
                    return Err(DriveError::NotFound(key));
                }
                None => {}
            }

            let children = self.children(store, &current.id, false).await?;
            match children.into_iter().find(|child| child.name == *segment) {
                Some(child) => {
                    self.cache.insert_found(key, child.clone());
                    current = child;
                }
                None => {
                    self.cache.insert_missing(key.clone());
                    return Err(DriveError::NotFound(key));
                }
            }
        }

        Ok(current)
    }

    /// Resolves `path` and requires the result to be a folder
    pub async fn resolve_folder<S>(
        &mut self,
        store: &S,
        path: &VirtualPath,
    ) -> Result<RemoteObject, DriveError>
    where
        S: IRemoteStore + ?Sized,
    {
        let object = self.resolve(store, path).await?;
        if !object.is_folder {
            return Err(DriveError::NotAFolder(path.as_key()));
        }
        Ok(object)
    }

    /// Lists the children of `parent`, answering from the cache when possible
    pub async fn children<S>(
        &mut self,
        store: &S,
        parent: &ObjectId,
        include_trashed: bool,
    ) -> Result<Vec<RemoteObject>, DriveError>
    where
        S: IRemoteStore + ?Sized,
    {
        if let Some(children) = self.cache.children(parent, include_trashed) {
            trace!(parent = %parent, "Children cache hit");
            return Ok(children.to_vec());
        }

        let children = store.list_children(parent, include_trashed).await?;
        self.cache
            .insert_children(parent.clone(), include_trashed, children.clone());
        Ok(children)
    }
}
