//! Domain error types
//!
//! This module defines validation errors for domain newtypes and the
//! [`DriveError`] taxonomy shared by the resolver, the store adapters and
//! the command layer.

use thiserror::Error;

/// Errors that can occur while validating domain values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid virtual path format or content
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Invalid object name (empty or containing a separator)
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Invalid remote object ID
    #[error("Invalid object ID: {0}")]
    InvalidObjectId(String),
}

/// Errors surfaced by remote store operations and path resolution
///
/// Every variant carries a human-readable message; the command layer is
/// responsible for presenting it and choosing the process exit status.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriveError {
    /// A path segment or the terminal object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A non-terminal path segment is a file
    #[error("Not a folder: {0}")]
    NotAFolder(String),

    /// The credential is missing, expired, or was rejected after a refresh
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The store reported a structured error
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code of the failed response
        status: u16,
        /// Message reported by the store, passed through verbatim
        message: String,
    },

    /// Transport-level failure (connection, TLS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// The resumable upload session could not be initiated
    #[error("Upload session error: {0}")]
    UploadSession(String),

    /// Local path missing or unreadable/unwritable
    #[error("Local filesystem error: {0}")]
    LocalFilesystem(String),

    /// The operation is not allowed on the root folder
    #[error("Operation not permitted on the root folder: {0}")]
    RootProtected(String),

    /// The request is malformed or conflicts with existing state
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The store answered with a body that could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl DriveError {
    /// Returns true for the "object does not exist" case
    pub fn is_not_found(&self) -> bool {
        matches!(self, DriveError::NotFound(_))
    }

    /// Returns true when the credential was rejected
    pub fn is_auth(&self) -> bool {
        matches!(self, DriveError::Auth(_))
    }
}

impl From<DomainError> for DriveError {
    fn from(err: DomainError) -> Self {
        DriveError::InvalidArgument(err.to_string())
    }
}

impl From<std::io::Error> for DriveError {
    fn from(err: std::io::Error) -> Self {
        DriveError::LocalFilesystem(err.to_string())
    }
}
