//! gdrive API - Google Drive v3 client
//!
//! Provides async components for:
//! - OAuth2 authentication (Authorization Code with PKCE)
//! - Metadata calls against the Drive v3 REST API
//! - Resumable uploads and streaming downloads with progress
//! - Resolution of human-readable paths over the ID-addressed object graph
//!
//! ## Modules
//!
//! - [`auth`] - OAuth2 PKCE flow and credential providers
//! - [`client`] - Drive v3 HTTP client
//! - [`upload`] / [`download`] - streaming transfers
//! - [`export`] - export formats for native documents
//! - [`local`] - local filesystem helpers for transfers
//! - [`provider`] - [`IRemoteStore`] implementation over the client
//! - [`cache`] / [`resolver`] - path resolution with per-command caching
//! - [`drive`] - path-addressed operations used by the command layer
//!
//! [`IRemoteStore`]: gdrive_core::ports::IRemoteStore

pub mod auth;
pub mod cache;
pub mod client;
pub mod download;
pub mod drive;
pub mod export;
pub mod local;
pub mod provider;
pub mod resolver;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;

pub use drive::{Drive, DownloadOutcome, RemoveMode, ShareLinks, UploadSummary};
pub use gdrive_core::domain::DriveError;
pub use provider::DriveProvider;
