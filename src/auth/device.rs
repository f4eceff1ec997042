//! Delegated user credential via the OAuth2 device code flow

use oauth2::basic::BasicClient;
use oauth2::{RefreshToken, Scope, StandardDeviceAuthorizationResponse, TokenResponse};
use tokio::sync::Mutex;

use super::tokens::CachedToken;
use super::{identity_client, DeviceCodeInfo, DeviceCodePrompt};
use crate::error::{Error, Result};

/// Credential representing the signed-in user.
///
/// The first `token()` call runs the interactive device code flow: the
/// prompt callback is invoked once with the verification URL and user code,
/// then the credential polls the token endpoint until the user completes
/// sign-in out of band or the code expires. Later calls serve the cached
/// token and fall back to the refresh token once it nears expiry.
pub struct DeviceCodeCredential {
    client: BasicClient,
    scopes: Vec<String>,
    prompt: DeviceCodePrompt,
    state: Mutex<TokenState>,
}

#[derive(Default)]
struct TokenState {
    access: Option<CachedToken>,
    refresh: Option<String>,
}

impl DeviceCodeCredential {
    pub fn new(
        auth_tenant: &str,
        client_id: &str,
        scopes: Vec<String>,
        prompt: DeviceCodePrompt,
    ) -> Result<Self> {
        Ok(Self {
            client: identity_client(auth_tenant, client_id, None)?,
            scopes,
            prompt,
            state: Mutex::new(TokenState::default()),
        })
    }

    /// Return a valid bearer token for the configured scopes.
    ///
    /// Suspends while waiting on network I/O and, when interactive sign-in
    /// is needed, on the user completing the device code flow. Dropping the
    /// returned future abandons the acquisition.
    pub async fn token(&self) -> Result<String> {
        let mut state = self.state.lock().await;

        if let Some(tok) = &state.access {
            if !tok.is_expired() {
                return Ok(tok.token.clone());
            }
        }

        // Try the refresh token before going interactive again
        if let Some(rt) = state.refresh.clone() {
            tracing::info!("Access token missing or expired, refreshing...");
            match self.refresh(&rt).await {
                Ok(response) => return Ok(store(&mut state, &response)),
                Err(e) => {
                    tracing::warn!("Refresh failed, falling back to device code: {}", e);
                }
            }
        }

        let response = self.sign_in().await?;
        Ok(store(&mut state, &response))
    }

    /// Run the interactive device code flow from scratch.
    async fn sign_in(&self) -> Result<oauth2::basic::BasicTokenResponse> {
        tracing::info!("Initiating device code flow...");

        let mut request = self
            .client
            .exchange_device_code()
            .map_err(|e| Error::Auth(e.to_string()))?;
        for scope in self.request_scopes() {
            request = request.add_scope(scope);
        }

        let details: StandardDeviceAuthorizationResponse = request
            .request_async(oauth2::reqwest::async_http_client)
            .await
            .map_err(|e| Error::Auth(format!("device code request failed: {}", e)))?;

        let verification_url = details.verification_uri().as_str().to_string();
        let user_code = details.user_code().secret().to_string();
        let info = DeviceCodeInfo {
            message: format!(
                "To sign in, use a web browser to open {} and enter the code {} to authenticate.",
                verification_url, user_code
            ),
            verification_url,
            user_code,
            expires_in: details.expires_in(),
        };

        // Exactly one prompt per acquisition attempt, before polling starts
        (self.prompt)(&info);

        tracing::info!("Waiting for user to complete sign-in...");
        self.client
            .exchange_device_access_token(&details)
            .request_async(oauth2::reqwest::async_http_client, tokio::time::sleep, None)
            .await
            .map_err(|e| Error::Auth(format!("device code sign-in failed: {}", e)))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<oauth2::basic::BasicTokenResponse> {
        let refresh_token = RefreshToken::new(refresh_token.to_string());
        let mut request = self.client.exchange_refresh_token(&refresh_token);
        for scope in self.request_scopes() {
            request = request.add_scope(scope);
        }

        request
            .request_async(oauth2::reqwest::async_http_client)
            .await
            .map_err(|e| Error::Auth(format!("token refresh failed: {}", e)))
    }

    /// Configured scopes plus offline_access so a refresh token is issued.
    fn request_scopes(&self) -> impl Iterator<Item = Scope> + '_ {
        self.scopes
            .iter()
            .cloned()
            .chain(std::iter::once("offline_access".to_string()))
            .map(Scope::new)
    }

    /// Credential with a pre-seeded access token, bypassing the network.
    #[cfg(test)]
    pub(crate) fn seeded(token: &str, prompt: DeviceCodePrompt) -> Self {
        let client = identity_client("common", "test-client", None)
            .unwrap_or_else(|_| unreachable!("static endpoint URLs are valid"));
        Self {
            client,
            scopes: vec!["user.read".into()],
            prompt,
            state: Mutex::new(TokenState {
                access: Some(CachedToken::new(
                    token.to_string(),
                    Some(std::time::Duration::from_secs(3600)),
                )),
                refresh: None,
            }),
        }
    }
}

/// Cache the access token (and refresh token, if issued) and return the
/// bearer string.
fn store(state: &mut TokenState, response: &oauth2::basic::BasicTokenResponse) -> String {
    let token = response.access_token().secret().to_string();
    state.access = Some(CachedToken::new(token.clone(), response.expires_in()));
    if let Some(rt) = response.refresh_token() {
        state.refresh = Some(rt.secret().to_string());
    }
    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_cached_token_served_without_prompt() {
        let prompts = Arc::new(AtomicUsize::new(0));
        let counter = prompts.clone();
        let cred = DeviceCodeCredential::seeded(
            "cached-token",
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let tok = cred.token().await.unwrap();
        assert_eq!(tok, "cached-token");
        // A valid cached token must not trigger interactive sign-in
        assert_eq!(prompts.load(Ordering::SeqCst), 0);
    }
}
