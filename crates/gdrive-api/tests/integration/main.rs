//! Integration tests for gdrive-api
//!
//! Uses wiremock to simulate the Drive v3 API and verifies end-to-end
//! behavior of the DriveClient, uploads, downloads, and path-addressed
//! operations through DriveProvider.

mod common;

mod test_client;
mod test_drive;
mod test_transfers;
