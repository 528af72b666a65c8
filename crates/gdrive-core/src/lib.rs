//! gdrive Core - Domain types and ports for path-addressed Google Drive access
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - `ObjectId`, `VirtualPath`, `RemoteObject`, `PermissionEntry`
//! - **Error taxonomy** - `DriveError` shared by every adapter
//! - **Transfer progress** - percentage arithmetic and the progress tracker
//! - **Listing adapter** - conversion of remote objects into display rows
//! - **Port definitions** - Traits for adapters: `IRemoteStore`, `ICredentialProvider`
//!
//! # Architecture
//!
//! The domain module contains pure logic with no I/O. Ports define the trait
//! interfaces that the `gdrive-api` adapters implement, so path resolution and
//! command orchestration can be exercised against in-memory stores.

pub mod config;
pub mod domain;
pub mod listing;
pub mod ports;
