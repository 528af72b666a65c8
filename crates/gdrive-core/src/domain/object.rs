//! Remote object metadata
//!
//! [`RemoteObject`] is the provider-agnostic view of a Drive `files`
//! resource. Adapters map wire DTOs into it; the resolver, the cache and the
//! listing adapter only ever see this type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::newtypes::ObjectId;

/// Mime type that marks an object as a folder
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Permission ID the store assigns to "anyone with the link"
pub const PUBLIC_PERMISSION_ID: &str = "anyoneWithLink";

/// Role of a single permission entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionRole {
    /// Grants access to anyone holding the link
    Public,
    /// Any user- or domain-scoped grant
    Private,
}

/// A single access grant on an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEntry {
    /// Store-assigned permission ID
    pub id: String,
    /// Public iff `id` is the well-known public sentinel
    pub role: PermissionRole,
}

impl PermissionEntry {
    /// Build an entry, classifying it by its ID
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        let role = if id == PUBLIC_PERMISSION_ID {
            PermissionRole::Public
        } else {
            PermissionRole::Private
        };
        Self { id, role }
    }
}

/// Desired global visibility of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
}

/// Display classification of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Folder,
    File,
    NativeDocument,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectKind::Folder => write!(f, "Folder"),
            ObjectKind::File => write!(f, "File"),
            ObjectKind::NativeDocument => write!(f, "Document"),
        }
    }
}

/// Metadata of a single node in the remote graph
///
/// Identity is `id`. `name` is unique neither among siblings nor globally,
/// and an object may list several parents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteObject {
    pub id: ObjectId,
    pub name: String,
    pub mime_type: String,
    pub is_folder: bool,
    /// Parent folder IDs in store order
    pub parent_ids: Vec<ObjectId>,
    /// Size in bytes; absent for folders and native documents
    pub size: Option<u64>,
    /// ISO-8601 creation timestamp as reported by the store
    pub created_at: Option<String>,
    /// ISO-8601 modification timestamp as reported by the store
    pub modified_at: Option<String>,
    /// Direct content link (`webContentLink`)
    pub download_link: Option<String>,
    /// Browser link (`webViewLink`)
    pub web_view_link: Option<String>,
    /// Export targets keyed by mime type, for native documents
    pub export_links: BTreeMap<String, String>,
    /// Name of the uploaded original; marks objects with direct content
    pub original_filename: Option<String>,
    pub permissions: Vec<PermissionEntry>,
    pub trashed: bool,
}

impl RemoteObject {
    /// The root folder sentinel, available without a network call
    pub fn root() -> Self {
        Self::folder(ObjectId::root(), "/", Vec::new())
    }

    /// A bare folder object with the given identity
    pub fn folder(id: ObjectId, name: impl Into<String>, parent_ids: Vec<ObjectId>) -> Self {
        Self {
            id,
            name: name.into(),
            mime_type: FOLDER_MIME_TYPE.to_string(),
            is_folder: true,
            parent_ids,
            size: None,
            created_at: None,
            modified_at: None,
            download_link: None,
            web_view_link: None,
            export_links: BTreeMap::new(),
            original_filename: None,
            permissions: Vec::new(),
            trashed: false,
        }
    }

    /// A bare regular file object with the given identity
    pub fn file(
        id: ObjectId,
        name: impl Into<String>,
        parent_ids: Vec<ObjectId>,
        size: u64,
    ) -> Self {
        let name = name.into();
        Self {
            mime_type: "application/octet-stream".to_string(),
            is_folder: false,
            size: Some(size),
            original_filename: Some(name.clone()),
            ..Self::folder(id, name, parent_ids)
        }
    }

    /// True iff any permission grants access to anyone with the link
    pub fn is_public(&self) -> bool {
        self.permissions
            .iter()
            .any(|p| p.role == PermissionRole::Public)
    }

    /// Display classification
    ///
    /// Folder if the mime type is the folder sentinel; native document if
    /// the object exposes export links without an original-content marker;
    /// file otherwise.
    pub fn kind(&self) -> ObjectKind {
        if self.mime_type == FOLDER_MIME_TYPE {
            ObjectKind::Folder
        } else if !self.export_links.is_empty() && self.original_filename.is_none() {
            ObjectKind::NativeDocument
        } else {
            ObjectKind::File
        }
    }

    /// Modification time, falling back to creation time
    pub fn last_modified(&self) -> Option<&str> {
        self.modified_at.as_deref().or(self.created_at.as_deref())
    }
}
