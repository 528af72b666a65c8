//! Metadata cache for path resolution
//!
//! Two in-memory maps with the lifetime of one command:
//! - resolved path key -> object (or a remembered miss)
//! - (folder ID, trashed filter) -> children in store order
//!
//! Entries are written only by the [`PathResolver`] and dropped wholesale
//! by [`MetadataCache::clear`] after any mutation. There is no TTL.
//!
//! [`PathResolver`]: crate::resolver::PathResolver

use std::collections::HashMap;

use gdrive_core::domain::{ObjectId, RemoteObject};

/// Result of an earlier path lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedLookup {
    /// The path resolved to this object
    Found(RemoteObject),
    /// No child with the final segment's name existed
    Missing,
}

/// Per-invocation metadata cache
#[derive(Debug, Default)]
pub struct MetadataCache {
    paths: HashMap<String, CachedLookup>,
    children: HashMap<(ObjectId, bool), Vec<RemoteObject>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an earlier resolution of the normalized path `key`
    pub fn path(&self, key: &str) -> Option<&CachedLookup> {
        self.paths.get(key)
    }

    /// Looks up an earlier listing of `parent`
    pub fn children(&self, parent: &ObjectId, include_trashed: bool) -> Option<&[RemoteObject]> {
        self.children
            .get(&(parent.clone(), include_trashed))
            .map(Vec::as_slice)
    }

    pub(crate) fn insert_found(&mut self, key: String, object: RemoteObject) {
        self.paths.insert(key, CachedLookup::Found(object));
    }

    pub(crate) fn insert_missing(&mut self, key: String) {
        self.paths.insert(key, CachedLookup::Missing);
    }

    pub(crate) fn insert_children(
        &mut self,
        parent: ObjectId,
        include_trashed: bool,
        children: Vec<RemoteObject>,
    ) {
        self.children.insert((parent, include_trashed), children);
    }

    /// Drops every entry
    pub fn clear(&mut self) {
        self.paths.clear();
        self.children.clear();
    }

    /// Total number of entries in both maps
    pub fn len(&self) -> usize {
        self.paths.len() + self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
