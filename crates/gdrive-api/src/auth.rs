//! OAuth2 PKCE authentication flow for Google Drive
//!
//! Implements the Authorization Code flow with PKCE (RFC 7636) for
//! installed applications, redirecting to a loopback address.
//!
//! ## Components
//!
//! - [`OAuth2Config`] - Configuration for the OAuth2 flow
//! - [`KeyringTokenStorage`] - Secure token storage using the system keyring
//! - [`PKCEFlow`] - OAuth2 PKCE challenge/exchange logic
//! - [`LocalCallbackServer`] - Minimal HTTP server for the OAuth redirect
//! - [`DriveAuthAdapter`] - Orchestrates the full authentication flow
//! - [`KeyringCredentials`] / [`StaticCredentials`] - [`ICredentialProvider`]
//!   implementations handed to the API client

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use gdrive_core::config::AuthConfig;
use gdrive_core::domain::DriveError;
use gdrive_core::ports::{ICredentialProvider, Tokens};
use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, RefreshToken,
    Scope, TokenResponse, TokenUrl,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Google OAuth2 authorization endpoint
const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google OAuth2 token endpoint
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Loopback address of the local callback server
const CALLBACK_ADDR: &str = "127.0.0.1:8400";

/// Default redirect URI for the local callback server
const REDIRECT_URI: &str = "http://127.0.0.1:8400/callback";

/// Keyring service name for storing tokens
const KEYRING_SERVICE: &str = "gdrive";

/// Default OAuth2 scope: full access to the user's Drive
const DEFAULT_SCOPES: &[&str] = &["https://www.googleapis.com/auth/drive"];

/// Access tokens this close to expiry are refreshed before use
const EXPIRY_MARGIN_SECS: i64 = 60;

// ============================================================================
// OAuth2Config
// ============================================================================

/// Configuration for the OAuth2 PKCE authentication flow
#[derive(Debug, Clone)]
pub struct OAuth2Config {
    /// OAuth client ID of the installed-app registration
    pub client_id: String,
    /// Client secret; installed apps are issued one, though it is not secret
    pub client_secret: Option<String>,
    /// Redirect URI for receiving the authorization code
    pub redirect_uri: String,
    /// OAuth scopes to request
    pub scopes: Vec<String>,
}

impl OAuth2Config {
    /// Creates a new OAuth2Config with the given client ID and default settings
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri: REDIRECT_URI.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Builds the flow configuration from the `auth` config section
    pub fn from_auth_config(auth: &AuthConfig) -> Result<Self> {
        let client_id = auth
            .client_id
            .clone()
            .context("auth.client_id is not configured")?;
        let mut config = Self::new(client_id);
        config.client_secret = auth.client_secret.clone();
        Ok(config)
    }

    /// Sets the client secret
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Creates a config with custom scopes
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }
}

// ============================================================================
// KeyringTokenStorage
// ============================================================================

/// Stores and retrieves OAuth tokens from the system keyring
///
/// Tokens are serialized as JSON under the service name "gdrive" with the
/// configured account name as the keyring username.
pub struct KeyringTokenStorage;

impl KeyringTokenStorage {
    /// Stores tokens in the system keyring for the given account
    pub fn store(account: &str, tokens: &Tokens) -> Result<()> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, account)
            .context("Failed to create keyring entry")?;

        let json = serde_json::to_string(tokens).context("Failed to serialize tokens")?;

        entry
            .set_password(&json)
            .context("Failed to store tokens in keyring")?;

        debug!(account, "Stored tokens in keyring");
        Ok(())
    }

    /// Loads tokens from the system keyring for the given account
    ///
    /// # Returns
    /// `Some(Tokens)` if found, `None` if the account never logged in
    pub fn load(account: &str) -> Result<Option<Tokens>> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, account)
            .context("Failed to create keyring entry")?;

        match entry.get_password() {
            Ok(json) => {
                let tokens: Tokens = serde_json::from_str(&json)
                    .context("Failed to deserialize tokens from keyring")?;
                debug!(account, "Loaded tokens from keyring");
                Ok(Some(tokens))
            }
            Err(keyring::Error::NoEntry) => {
                debug!(account, "No tokens found in keyring");
                Ok(None)
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to read from keyring")),
        }
    }

    /// Removes tokens from the system keyring for the given account
    pub fn clear(account: &str) -> Result<()> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, account)
            .context("Failed to create keyring entry")?;

        match entry.delete_credential() {
            Ok(()) => {
                info!(account, "Cleared tokens from keyring");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => {
                debug!(account, "No tokens to clear");
                Ok(())
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to delete from keyring")),
        }
    }
}

// ============================================================================
// PKCEFlow
// ============================================================================

/// OAuth2 PKCE flow implementation using the `oauth2` crate
pub struct PKCEFlow {
    client: BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>,
    scopes: Vec<String>,
}

impl PKCEFlow {
    /// Creates a new PKCEFlow with the given configuration
    pub fn new(config: &OAuth2Config) -> Result<Self> {
        let mut client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_auth_uri(AuthUrl::new(AUTH_URL.to_string()).context("Invalid authorization URL")?)
            .set_token_uri(TokenUrl::new(TOKEN_URL.to_string()).context("Invalid token URL")?)
            .set_redirect_uri(
                RedirectUrl::new(config.redirect_uri.clone()).context("Invalid redirect URI")?,
            );
        if let Some(secret) = &config.client_secret {
            client = client.set_client_secret(ClientSecret::new(secret.clone()));
        }

        Ok(Self {
            client,
            scopes: config.scopes.clone(),
        })
    }

    /// Generates an authorization URL with a PKCE challenge
    ///
    /// Offline access is requested so the response carries a refresh token.
    ///
    /// # Returns
    /// A tuple of `(authorization_url, csrf_token, pkce_verifier)`.
    pub fn generate_auth_url(&self) -> (String, CsrfToken, PkceCodeVerifier) {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_request = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent");

        for scope in &self.scopes {
            auth_request = auth_request.add_scope(Scope::new(scope.clone()));
        }

        let (auth_url, csrf_token) = auth_request.set_pkce_challenge(pkce_challenge).url();

        debug!("Generated authorization URL");
        (auth_url.to_string(), csrf_token, pkce_verifier)
    }

    /// Exchanges an authorization code for OAuth tokens
    pub async fn exchange_code(
        &self,
        code: String,
        pkce_verifier: PkceCodeVerifier,
    ) -> Result<Tokens> {
        info!("Exchanging authorization code for tokens");

        let http_client = reqwest::Client::new();
        let token_result = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(&http_client)
            .await
            .context("Failed to exchange authorization code")?;

        let tokens = Tokens {
            access_token: token_result.access_token().secret().to_string(),
            refresh_token: token_result.refresh_token().map(|t| t.secret().to_string()),
            expires_at: expiry_from(token_result.expires_in()),
        };

        info!("Successfully obtained OAuth tokens");
        Ok(tokens)
    }

    /// Refreshes an expired access token using a refresh token
    ///
    /// Google does not rotate refresh tokens, so the given one is kept when
    /// the response omits it.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Tokens> {
        info!("Refreshing access token");

        let http_client = reqwest::Client::new();
        let token_result = self
            .client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(&http_client)
            .await
            .context("Failed to refresh token")?;

        let tokens = Tokens {
            access_token: token_result.access_token().secret().to_string(),
            refresh_token: token_result
                .refresh_token()
                .map(|t| t.secret().to_string())
                .or_else(|| Some(refresh_token.to_string())),
            expires_at: expiry_from(token_result.expires_in()),
        };

        info!("Successfully refreshed access token");
        Ok(tokens)
    }
}

fn expiry_from(expires_in: Option<std::time::Duration>) -> chrono::DateTime<Utc> {
    expires_in
        .map(|d| Utc::now() + Duration::seconds(d.as_secs() as i64))
        .unwrap_or_else(|| Utc::now() + Duration::hours(1))
}

// ============================================================================
// LocalCallbackServer
// ============================================================================

/// Minimal HTTP server that listens on localhost for the OAuth2 redirect callback.
///
/// Waits on `127.0.0.1:8400` for the browser to be redirected back with an
/// authorization code, answers with a short HTML page, and shuts down.
pub struct LocalCallbackServer;

/// Parameters extracted from the OAuth2 callback
#[derive(Debug)]
pub struct CallbackParams {
    /// The authorization code
    pub code: String,
    /// The CSRF state parameter
    pub state: String,
}

impl LocalCallbackServer {
    /// Starts the local callback server and waits for the OAuth redirect
    pub async fn start() -> Result<CallbackParams> {
        use http_body_util::Full;
        use hyper::body::Bytes;
        use hyper::server::conn::http1;
        use hyper::service::service_fn;
        use hyper::{Request, Response, StatusCode};
        use hyper_util::rt::TokioIo;
        use tokio::net::TcpListener;
        use tokio::sync::oneshot;

        info!("Starting local OAuth callback server on {}", CALLBACK_ADDR);

        let listener = TcpListener::bind(CALLBACK_ADDR)
            .await
            .with_context(|| format!("Failed to bind callback server to {CALLBACK_ADDR}"))?;

        let (tx, rx) = oneshot::channel::<CallbackParams>();
        let tx = std::sync::Arc::new(Mutex::new(Some(tx)));

        // Browsers may probe other paths (favicon) first; keep serving
        // connections until the callback arrives.
        let server = tokio::spawn(async move {
            loop {
                let (stream, _addr) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!("Callback server accept error: {}", e);
                        return;
                    }
                };
                let io = TokioIo::new(stream);
                let tx = tx.clone();

                let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                    let tx = tx.clone();
                    async move {
                        let uri = req.uri().to_string();
                        debug!("Callback server received request: {}", uri);

                        let (status, html) = match parse_callback_params(&uri) {
                            Some(params) => {
                                if let Some(sender) = tx.lock().await.take() {
                                    let _ = sender.send(params);
                                }
                                (StatusCode::OK, success_html())
                            }
                            None => (
                                StatusCode::BAD_REQUEST,
                                error_html("Missing authorization code in callback"),
                            ),
                        };

                        let mut response = Response::new(Full::new(Bytes::from(html)));
                        *response.status_mut() = status;
                        response.headers_mut().insert(
                            hyper::header::CONTENT_TYPE,
                            hyper::header::HeaderValue::from_static("text/html; charset=utf-8"),
                        );
                        Ok::<_, hyper::Error>(response)
                    }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    warn!("Callback server connection error: {}", e);
                }
            }
        });

        let params = rx
            .await
            .context("Callback server channel closed without receiving parameters");
        server.abort();
        let params = params?;

        info!("Received OAuth callback with authorization code");
        Ok(params)
    }
}

/// Parses the authorization code and state from a callback URI
fn parse_callback_params(uri: &str) -> Option<CallbackParams> {
    let url = url::Url::parse(&format!("http://localhost{}", uri)).ok()?;
    let mut code = None;
    let mut state = None;

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.to_string()),
            "state" => state = Some(value.to_string()),
            _ => {}
        }
    }

    Some(CallbackParams {
        code: code?,
        state: state.unwrap_or_default(),
    })
}

/// Returns the HTML for a successful authentication page
fn success_html() -> String {
    r#"<!DOCTYPE html>
<html>
<head><title>gdrive - Authentication Successful</title></head>
<body style="font-family: sans-serif; text-align: center; padding-top: 50px;">
    <h1>Authentication Successful</h1>
    <p>gdrive can now access your Google Drive.</p>
    <p>You can close this window and return to the terminal.</p>
</body>
</html>"#
        .to_string()
}

/// Returns the HTML for an authentication error page
fn error_html(message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>gdrive - Authentication Error</title></head>
<body style="font-family: sans-serif; text-align: center; padding-top: 50px;">
    <h1>Authentication Error</h1>
    <p>{}</p>
    <p>Please close this window and try again.</p>
</body>
</html>"#,
        message
    )
}

// ============================================================================
// DriveAuthAdapter
// ============================================================================

/// High-level authentication adapter that orchestrates the full OAuth2 PKCE flow.
///
/// 1. Generates PKCE authorization URL
/// 2. Opens the user's browser to the Google consent page
/// 3. Starts a local callback server to receive the redirect
/// 4. Verifies the CSRF state and exchanges the code for tokens
pub struct DriveAuthAdapter {
    config: OAuth2Config,
}

impl DriveAuthAdapter {
    /// Creates a new DriveAuthAdapter with the given configuration
    pub fn new(config: OAuth2Config) -> Self {
        Self { config }
    }

    /// Performs the full interactive OAuth2 PKCE login flow
    pub async fn login(&self) -> Result<Tokens> {
        info!("Starting OAuth2 PKCE login flow");

        let flow = PKCEFlow::new(&self.config)?;
        let (auth_url, csrf_token, pkce_verifier) = flow.generate_auth_url();

        info!("Opening browser for authentication");
        if let Err(e) = webbrowser::open(&auth_url) {
            warn!("Failed to open browser: {}", e);
            eprintln!("Open this URL in your browser to continue:\n\n  {auth_url}\n");
        }

        let callback = LocalCallbackServer::start().await?;
        if callback.state != *csrf_token.secret() {
            anyhow::bail!("OAuth callback state does not match the request");
        }

        let tokens = flow.exchange_code(callback.code, pkce_verifier).await?;

        info!("OAuth2 PKCE login completed successfully");
        Ok(tokens)
    }

    /// Refreshes an expired access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<Tokens> {
        let flow = PKCEFlow::new(&self.config)?;
        flow.refresh_token(refresh_token).await
    }

    /// Returns a reference to the current configuration
    pub fn config(&self) -> &OAuth2Config {
        &self.config
    }
}

// ============================================================================
// Credential providers
// ============================================================================

/// A fixed bearer token, e.g. from the `GDRIVE_ACCESS_TOKEN` environment variable
///
/// Cannot refresh; a rejected token surfaces as [`DriveError::Auth`].
pub struct StaticCredentials {
    token: String,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait::async_trait]
impl ICredentialProvider for StaticCredentials {
    async fn access_token(&self) -> Result<String, DriveError> {
        Ok(self.token.clone())
    }

    async fn refresh(&self) -> Result<String, DriveError> {
        Err(DriveError::Auth(
            "the configured access token was rejected and cannot be refreshed".to_string(),
        ))
    }
}

/// Tokens persisted in the system keyring, refreshed through [`DriveAuthAdapter`]
pub struct KeyringCredentials {
    account: String,
    adapter: DriveAuthAdapter,
    tokens: Mutex<Option<Tokens>>,
}

impl KeyringCredentials {
    pub fn new(account: impl Into<String>, config: OAuth2Config) -> Self {
        Self {
            account: account.into(),
            adapter: DriveAuthAdapter::new(config),
            tokens: Mutex::new(None),
        }
    }

    fn auth_error(error: anyhow::Error) -> DriveError {
        DriveError::Auth(format!("{error:#}"))
    }

    /// Exchanges the refresh token and persists the result
    async fn refresh_locked(&self, slot: &mut Option<Tokens>) -> Result<String, DriveError> {
        let refresh_token = slot
            .as_ref()
            .and_then(|t| t.refresh_token.clone())
            .ok_or_else(|| {
                DriveError::Auth("session expired; run `gdrive auth login`".to_string())
            })?;

        let tokens = self
            .adapter
            .refresh(&refresh_token)
            .await
            .map_err(Self::auth_error)?;
        if let Err(e) = KeyringTokenStorage::store(&self.account, &tokens) {
            warn!("Could not persist refreshed tokens: {:#}", e);
        }
        let access = tokens.access_token.clone();
        *slot = Some(tokens);
        Ok(access)
    }
}

#[async_trait::async_trait]
impl ICredentialProvider for KeyringCredentials {
    async fn access_token(&self) -> Result<String, DriveError> {
        let mut slot = self.tokens.lock().await;
        if slot.is_none() {
            *slot = KeyringTokenStorage::load(&self.account).map_err(Self::auth_error)?;
        }

        let tokens = slot.as_ref().ok_or_else(|| {
            DriveError::Auth("not logged in; run `gdrive auth login`".to_string())
        })?;
        if !tokens.expires_within(Duration::seconds(EXPIRY_MARGIN_SECS)) {
            return Ok(tokens.access_token.clone());
        }

        debug!("Access token expired or about to expire");
        self.refresh_locked(&mut slot).await
    }

    async fn refresh(&self) -> Result<String, DriveError> {
        let mut slot = self.tokens.lock().await;
        if slot.is_none() {
            *slot = KeyringTokenStorage::load(&self.account).map_err(Self::auth_error)?;
        }
        self.refresh_locked(&mut slot).await
    }
}
