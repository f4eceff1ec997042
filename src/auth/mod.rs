//! Credential implementations for the Microsoft identity platform
//!
//! Two mutually exclusive credential modes exist: a delegated user identity
//! acquired through the OAuth2 device code flow, and an application identity
//! acquired through the client credentials flow. Both cache their access
//! token in memory and re-acquire it transparently when it nears expiry.

pub mod device;
pub mod secret;
pub mod tokens;

use std::sync::Arc;
use std::time::Duration;

use oauth2::basic::BasicClient;
use oauth2::{AuthType, AuthUrl, ClientId, ClientSecret, DeviceAuthorizationUrl, TokenUrl};

pub use device::DeviceCodeCredential;
pub use secret::ClientSecretCredential;

use crate::error::{Error, Result};

/// Default scope asking for whatever permissions the app registration grants.
pub const DEFAULT_APP_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Details of a pending device code sign-in, surfaced to the user.
#[derive(Debug, Clone)]
pub struct DeviceCodeInfo {
    /// URL the user must open in a browser
    pub verification_url: String,
    /// Code the user enters at the verification URL
    pub user_code: String,
    /// Ready-made prompt text combining URL and code
    pub message: String,
    /// How long the code stays valid
    pub expires_in: Duration,
}

/// Callback that shows a pending device code to the user.
///
/// Invoked exactly once per token acquisition attempt, before polling
/// begins. It should return once the user has been informed, not once
/// sign-in completes; the credential polls for completion itself.
pub type DeviceCodePrompt = Arc<dyn Fn(&DeviceCodeInfo) + Send + Sync>;

/// Build an OAuth2 client against the Microsoft identity platform v2.0
/// endpoints for the given tenant.
fn identity_client(
    tenant: &str,
    client_id: &str,
    client_secret: Option<&str>,
) -> Result<BasicClient> {
    let auth_url = AuthUrl::new(format!(
        "https://login.microsoftonline.com/{}/oauth2/v2.0/authorize",
        tenant
    ))
    .map_err(|e| Error::Auth(format!("invalid authorize URL: {}", e)))?;
    let token_url = TokenUrl::new(format!(
        "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
        tenant
    ))
    .map_err(|e| Error::Auth(format!("invalid token URL: {}", e)))?;
    let device_url = DeviceAuthorizationUrl::new(format!(
        "https://login.microsoftonline.com/{}/oauth2/v2.0/devicecode",
        tenant
    ))
    .map_err(|e| Error::Auth(format!("invalid device code URL: {}", e)))?;

    Ok(BasicClient::new(
        ClientId::new(client_id.to_string()),
        client_secret.map(|s| ClientSecret::new(s.to_string())),
        auth_url,
        Some(token_url),
    )
    .set_device_authorization_url(device_url)
    // The identity platform expects client credentials in the request body
    .set_auth_type(AuthType::RequestBody))
}

/// A credential capable of producing bearer tokens for Graph requests.
pub enum Credential {
    /// Delegated user identity (interactive device code flow)
    DeviceCode(DeviceCodeCredential),
    /// Application identity (non-interactive client secret flow)
    ClientSecret(ClientSecretCredential),
}

impl Credential {
    /// Return a valid bearer token, acquiring or refreshing as needed.
    /// May suspend on network I/O and, for the device code variant, on
    /// out-of-band user interaction.
    pub async fn token(&self) -> Result<String> {
        match self {
            Credential::DeviceCode(c) => c.token().await,
            Credential::ClientSecret(c) => c.token().await,
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::DeviceCode(_) => f.write_str("Credential::DeviceCode"),
            Credential::ClientSecret(_) => f.write_str("Credential::ClientSecret"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_client_builds_for_tenant() {
        assert!(identity_client("common", "client-id", None).is_ok());
        assert!(identity_client("tenant-guid", "client-id", Some("secret")).is_ok());
    }
}
