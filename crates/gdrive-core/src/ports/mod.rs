//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are interfaces the core depends on, but whose implementations live
//! in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteStore`] - Typed operations against the remote object graph
//! - [`ICredentialProvider`] - Bearer tokens for authenticated calls

pub mod credentials;
pub mod remote_store;

pub use credentials::{ICredentialProvider, Tokens};
pub use remote_store::{DownloadSource, IRemoteStore};
