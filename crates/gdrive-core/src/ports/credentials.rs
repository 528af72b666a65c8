//! Credential provider port (driven/secondary port)
//!
//! The remote store adapters only consume bearer tokens. Obtaining the
//! first set of credentials (the interactive OAuth2 flow) and persisting
//! them is the business of the adapter behind this trait.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DriveError;

/// OAuth tokens received from the authorization server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tokens {
    /// Bearer token for authenticating API requests
    pub access_token: String,
    /// Token for obtaining new access tokens without user interaction
    pub refresh_token: Option<String>,
    /// When the access token expires
    pub expires_at: DateTime<Utc>,
}

impl Tokens {
    /// Returns true if the access token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Returns true if the access token will expire within the given duration
    pub fn expires_within(&self, duration: chrono::Duration) -> bool {
        Utc::now() + duration >= self.expires_at
    }
}

/// Port trait supplying bearer tokens
#[async_trait::async_trait]
pub trait ICredentialProvider: Send + Sync {
    /// Returns a currently valid access token
    ///
    /// Fails with [`DriveError::Auth`] if no valid session exists.
    async fn access_token(&self) -> Result<String, DriveError>;

    /// Obtains a fresh access token after the store rejected the current one
    async fn refresh(&self) -> Result<String, DriveError>;
}
