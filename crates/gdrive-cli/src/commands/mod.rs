//! Command handlers
//!
//! Each handler resolves its path arguments through a [`Drive`] built for
//! the invocation, performs one operation, and reports the result through
//! the selected [`OutputFormatter`].

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use gdrive_api::auth::{KeyringCredentials, OAuth2Config, StaticCredentials};
use gdrive_api::client::DriveClient;
use gdrive_api::{Drive, DriveProvider};
use gdrive_core::config::Config;
use gdrive_core::domain::{DriveError, ProgressCallback, VirtualPath};
use gdrive_core::ports::ICredentialProvider;
use tracing::debug;

use crate::output::{get_formatter, progress_reporter, OutputFormat, OutputFormatter};

pub mod auth;
pub mod config;
pub mod list;
pub mod objects;
pub mod transfer;
pub mod trash;

/// Environment variable holding a bearer token that bypasses the keyring
pub const ACCESS_TOKEN_ENV: &str = "GDRIVE_ACCESS_TOKEN";

/// Per-invocation state shared by every command
pub struct Context {
    pub format: OutputFormat,
    pub quiet: bool,
    pub config_path: PathBuf,
    pub config: Config,
}

impl Context {
    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.is_json())
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Progress display for a transfer, unless output is JSON or quiet
    pub fn progress(&self, label: impl Into<String>) -> Option<ProgressCallback> {
        (!self.quiet && !self.is_json()).then(|| progress_reporter(label.into()))
    }

    /// Builds the path-addressed client for this invocation
    ///
    /// The metadata cache lives inside the returned [`Drive`] and is dropped
    /// with it when the command finishes.
    pub fn connect(&self) -> Result<Drive<DriveProvider>> {
        let token = std::env::var(ACCESS_TOKEN_ENV).ok();
        let credentials = credentials_for(&self.config, token.as_deref())?;
        let client = DriveClient::from_config(&self.config, credentials);
        Ok(Drive::new(DriveProvider::new(client)))
    }
}

/// Picks the credential source: an explicit token wins over the keyring
fn credentials_for(
    config: &Config,
    token: Option<&str>,
) -> Result<Arc<dyn ICredentialProvider>> {
    if let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) {
        debug!("Using access token from {}", ACCESS_TOKEN_ENV);
        return Ok(Arc::new(StaticCredentials::new(token)));
    }

    let oauth = OAuth2Config::from_auth_config(&config.auth).with_context(|| {
        format!("Set auth.client_id in the config file or export {ACCESS_TOKEN_ENV}")
    })?;
    Ok(Arc::new(KeyringCredentials::new(
        config.auth.account.clone(),
        oauth,
    )))
}

/// Parses a command-line path argument
pub fn parse_path(input: &str) -> Result<VirtualPath> {
    VirtualPath::parse(input)
        .map_err(DriveError::from)
        .with_context(|| format!("Invalid path '{input}'"))
}
