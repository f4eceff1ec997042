//! Application credential via the OAuth2 client credentials flow

use oauth2::basic::BasicClient;
use oauth2::{Scope, TokenResponse};
use tokio::sync::Mutex;

use super::tokens::CachedToken;
use super::{identity_client, DEFAULT_APP_SCOPE};
use crate::error::{Error, Result};

/// Credential representing the application itself, not any signed-in user.
///
/// Tokens are acquired non-interactively with the client secret against the
/// app registration's tenant, always for the fixed default scope, and cached
/// until they near expiry.
pub struct ClientSecretCredential {
    client: BasicClient,
    cached: Mutex<Option<CachedToken>>,
}

impl ClientSecretCredential {
    pub fn new(tenant_id: &str, client_id: &str, client_secret: &str) -> Result<Self> {
        Ok(Self {
            client: identity_client(tenant_id, client_id, Some(client_secret))?,
            cached: Mutex::new(None),
        })
    }

    /// Return a valid bearer token for the application identity.
    pub async fn token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(tok) = cached.as_ref() {
            if !tok.is_expired() {
                return Ok(tok.token.clone());
            }
        }

        tracing::info!("Acquiring app-only token...");
        let response = self
            .client
            .exchange_client_credentials()
            .add_scope(Scope::new(DEFAULT_APP_SCOPE.to_string()))
            .request_async(oauth2::reqwest::async_http_client)
            .await
            .map_err(|e| Error::Auth(format!("client credentials grant failed: {}", e)))?;

        let token = response.access_token().secret().to_string();
        *cached = Some(CachedToken::new(token.clone(), response.expires_in()));
        Ok(token)
    }
}
