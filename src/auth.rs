//! OAuth2 authentication for the Gmail API
//!
//! Interactive runs use the installed-app flow with an on-disk token cache.
//! Scheduled runs use an authorized-user secret (refresh token) supplied via
//! the environment or a file, and never open a browser.

use google_gmail1::{hyper_rustls, hyper_util, yup_oauth2, Gmail};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::debug;
use yup_oauth2::authorized_user::AuthorizedUserSecret;

use crate::error::{CleanupError, Result};

/// Read/write access without permanent deletion; trash is reversible
pub const MODIFY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.modify";

/// Environment variable holding the authorized-user secret as JSON
pub const AUTHORIZED_USER_ENV: &str = "GMAIL_AUTHORIZED_USER";

/// Type alias for Gmail Hub to simplify type signatures
pub type GmailHub = Gmail<hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>>;

/// Initialize Gmail API hub with the installed-app OAuth2 flow
///
/// Opens a browser on first use; afterwards the cached token at
/// `token_cache_path` is refreshed silently.
pub async fn initialize_gmail_hub(
    credentials_path: &Path,
    token_cache_path: &Path,
) -> Result<GmailHub> {
    let secret = yup_oauth2::read_application_secret(credentials_path)
        .await
        .map_err(|e| CleanupError::AuthError(format!("Failed to read credentials: {}", e)))?;

    // HTTPRedirect opens a browser for user authorization
    let auth = yup_oauth2::InstalledFlowAuthenticator::builder(
        secret,
        yup_oauth2::InstalledFlowReturnMethod::HTTPRedirect,
    )
    .persist_tokens_to_disk(token_cache_path)
    .build()
    .await
    .map_err(|e| CleanupError::AuthError(format!("Failed to build authenticator: {}", e)))?;

    // Authenticate up front so failures surface before any mailbox work
    auth.token(&[MODIFY_SCOPE])
        .await
        .map_err(|e| CleanupError::AuthError(format!("Failed to obtain token: {}", e)))?;

    if token_cache_path.exists() {
        secure_token_file(token_cache_path).await?;
    }

    let client = hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
        .build(https_connector()?);

    Ok(Gmail::new(client, auth))
}

/// Initialize Gmail API hub from an authorized-user secret
///
/// Used for unattended runs. The refresh token is exchanged immediately so an
/// expired or revoked grant is reported as an `AuthError` before processing.
pub async fn initialize_gmail_hub_from_authorized_user(
    user: AuthorizedUser,
) -> Result<GmailHub> {
    let auth = yup_oauth2::AuthorizedUserAuthenticator::builder(user.into_secret())
        .build()
        .await
        .map_err(|e| CleanupError::AuthError(format!("Failed to build authenticator: {}", e)))?;

    auth.token(&[MODIFY_SCOPE])
        .await
        .map_err(|e| CleanupError::AuthError(format!("Failed to refresh token: {}", e)))?;

    let client = hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
        .build(https_connector()?);

    Ok(Gmail::new(client, auth))
}

/// HTTPS connector with native TLS roots, HTTP/1 only
fn https_connector(
) -> Result<hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>> {
    Ok(hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()
        .map_err(|e| CleanupError::AuthError(format!("Failed to load TLS roots: {}", e)))?
        .https_or_http()
        .enable_http1()
        .build())
}

/// Authorized-user credentials: an OAuth client plus a long-lived refresh token
///
/// Accepts the JSON written by `gcloud auth application-default login` as
/// well as exported token files that omit the `type` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(rename = "type", default = "default_key_type")]
    pub key_type: String,
}

fn default_key_type() -> String {
    "authorized_user".to_string()
}

impl AuthorizedUser {
    /// Parse from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let user: AuthorizedUser = serde_json::from_str(json)
            .map_err(|e| CleanupError::AuthError(format!("Invalid authorized-user secret: {}", e)))?;

        if user.refresh_token.trim().is_empty() {
            return Err(CleanupError::AuthError(
                "Authorized-user secret has an empty refresh_token".to_string(),
            ));
        }

        Ok(user)
    }

    fn into_secret(self) -> AuthorizedUserSecret {
        AuthorizedUserSecret {
            client_id: self.client_id,
            client_secret: self.client_secret,
            refresh_token: self.refresh_token,
            key_type: self.key_type,
        }
    }
}

/// Load the authorized-user secret for a scheduled run
///
/// `GMAIL_AUTHORIZED_USER` takes precedence; otherwise the file at `path` is
/// read. With neither available this is an `AuthError`.
pub async fn load_authorized_user(path: Option<&Path>) -> Result<AuthorizedUser> {
    if let Some(user) = load_authorized_user_from_env()? {
        debug!("Using authorized-user secret from {}", AUTHORIZED_USER_ENV);
        return Ok(user);
    }

    let path = path.ok_or_else(|| {
        CleanupError::AuthError(format!(
            "No credentials: set {} or pass --authorized-user",
            AUTHORIZED_USER_ENV
        ))
    })?;

    debug!("Reading authorized-user secret from {}", path.display());
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        CleanupError::AuthError(format!("Failed to read {}: {}", path.display(), e))
    })?;

    AuthorizedUser::from_json(&content)
}

/// Read the authorized-user secret from the environment, if set
pub fn load_authorized_user_from_env() -> Result<Option<AuthorizedUser>> {
    match env::var(AUTHORIZED_USER_ENV) {
        Ok(json) if !json.trim().is_empty() => AuthorizedUser::from_json(&json).map(Some),
        _ => Ok(None),
    }
}

/// Secure token file permissions on Unix systems
///
/// Sets file permissions to 0600 (read/write for owner only)
#[cfg(unix)]
pub async fn secure_token_file(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(0o600);
    tokio::fs::set_permissions(path, perms).await?;
    Ok(())
}

/// Windows uses ACLs, so there is nothing to tighten here
#[cfg(windows)]
pub async fn secure_token_file(_path: &Path) -> Result<()> {
    Ok(())
}
