//! Auth commands - Login, Logout, and Status for Google Drive authentication
//!
//! Provides the `gdrive auth` CLI subcommands which:
//! 1. `login`  - Runs the OAuth2 PKCE flow via DriveAuthAdapter and stores
//!    the tokens in the system keyring under the configured account name.
//! 2. `logout` - Clears the tokens from the keyring.
//! 3. `status` - Shows which credential source is active and token validity.

use anyhow::{Context as _, Result};
use clap::Subcommand;
use gdrive_api::auth::{DriveAuthAdapter, KeyringTokenStorage, OAuth2Config};
use gdrive_core::config::AuthConfig;
use gdrive_core::ports::Tokens;
use tracing::info;

use super::{Context, ACCESS_TOKEN_ENV};

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Authenticate with Google via OAuth2
    Login {
        /// OAuth client ID; overrides auth.client_id
        #[arg(long)]
        client_id: Option<String>,
        /// OAuth client secret; overrides auth.client_secret
        #[arg(long)]
        client_secret: Option<String>,
    },
    /// Remove stored credentials
    Logout,
    /// Check authentication status
    Status,
}

impl AuthCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        match self {
            AuthCommand::Login {
                client_id,
                client_secret,
            } => {
                self.execute_login(ctx, client_id.as_deref(), client_secret.as_deref())
                    .await
            }
            AuthCommand::Logout => self.execute_logout(ctx).await,
            AuthCommand::Status => self.execute_status(ctx).await,
        }
    }

    /// Runs the browser flow and persists the tokens
    async fn execute_login(
        &self,
        ctx: &Context,
        client_id: Option<&str>,
        client_secret: Option<&str>,
    ) -> Result<()> {
        let fmt = ctx.formatter();
        let auth = login_settings(&ctx.config.auth, client_id, client_secret);
        let oauth = OAuth2Config::from_auth_config(&auth)
            .context("No client ID provided. Use --client-id or set auth.client_id")?;

        info!(account = %auth.account, "Starting OAuth2 login");
        fmt.info("Opening browser for Google login...");

        let adapter = DriveAuthAdapter::new(oauth);
        let tokens = adapter.login().await.context("OAuth2 login failed")?;

        KeyringTokenStorage::store(&auth.account, &tokens)
            .context("Failed to store tokens in keyring")?;

        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({
                "authenticated": true,
                "account": auth.account,
                "expires_at": tokens.expires_at.to_rfc3339(),
            }));
        } else {
            fmt.success(&format!("Authenticated account '{}'", auth.account));
            fmt.info("Tokens stored in the system keyring");
        }
        Ok(())
    }

    async fn execute_logout(&self, ctx: &Context) -> Result<()> {
        let fmt = ctx.formatter();
        let account = &ctx.config.auth.account;
        info!(account = %account, "Logging out");

        KeyringTokenStorage::clear(account).context("Failed to clear tokens from keyring")?;

        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({ "logged_out": true, "account": account }));
        } else {
            fmt.success("Logged out successfully");
            fmt.info("Credentials removed from keyring");
        }
        Ok(())
    }

    async fn execute_status(&self, ctx: &Context) -> Result<()> {
        let fmt = ctx.formatter();
        let account = &ctx.config.auth.account;
        let env_token = std::env::var(ACCESS_TOKEN_ENV).is_ok_and(|t| !t.trim().is_empty());

        let stored = KeyringTokenStorage::load(account);
        let status = match &stored {
            Ok(tokens) => token_status(tokens.as_ref()),
            Err(_) => "Error reading keyring",
        };
        let expires_at = stored
            .ok()
            .flatten()
            .map(|t| t.expires_at.format("%Y-%m-%d %H:%M:%S UTC").to_string());

        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({
                "account": account,
                "token_status": status,
                "expires_at": expires_at,
                "env_token": env_token,
                "client_id_configured": ctx.config.auth.client_id.is_some(),
            }));
            return Ok(());
        }

        if env_token {
            fmt.success(&format!("Using access token from {ACCESS_TOKEN_ENV}"));
        }
        fmt.info(&format!("Account:       {}", account));
        fmt.info(&format!("Token status:  {}", status));
        if let Some(expires_at) = expires_at {
            fmt.info(&format!("Expires:       {}", expires_at));
        }
        if ctx.config.auth.client_id.is_none() && !env_token {
            fmt.warn("auth.client_id is not set; stored tokens cannot be refreshed");
        }
        Ok(())
    }
}

/// Merges command-line overrides into the configured auth section
fn login_settings(
    configured: &AuthConfig,
    client_id: Option<&str>,
    client_secret: Option<&str>,
) -> AuthConfig {
    AuthConfig {
        client_id: client_id
            .map(str::to_string)
            .or_else(|| configured.client_id.clone()),
        client_secret: client_secret
            .map(str::to_string)
            .or_else(|| configured.client_secret.clone()),
        account: configured.account.clone(),
    }
}

/// Human-readable state of the stored tokens
fn token_status(tokens: Option<&Tokens>) -> &'static str {
    match tokens {
        None => "Not logged in",
        Some(t) if !t.is_expired() => "Valid",
        Some(t) if t.refresh_token.is_some() => "Expired (will refresh)",
        Some(_) => "Expired",
    }
}
