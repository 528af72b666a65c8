//! Domain entities and business logic
//!
//! - Newtypes for object identifiers and virtual paths
//! - Remote object metadata and permission classification
//! - Transfer progress tracking
//! - Domain-specific error types

pub mod errors;
pub mod newtypes;
pub mod object;
pub mod progress;

// Re-export commonly used types
pub use errors::{DomainError, DriveError};
pub use newtypes::{ObjectId, VirtualPath, ROOT_ID};
pub use object::{
    ObjectKind, PermissionEntry, PermissionRole, RemoteObject, Visibility, FOLDER_MIME_TYPE,
    PUBLIC_PERMISSION_ID,
};
pub use progress::{progress_percent, ProgressCallback, ProgressTracker, TransferProgress};
