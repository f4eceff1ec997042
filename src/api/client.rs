//! Authenticated HTTP client for the Graph API
//!
//! Wraps reqwest::Client with bearer token injection from a credential.
//! No retry or backoff lives here; transport and service failures pass
//! through to the caller unmodified.

use serde::Serialize;

use crate::auth::Credential;
use crate::error::{Error, Result};

const GRAPH_BASE: &str = "https://graph.microsoft.com/v1.0";

/// HTTP client bound to exactly one credential.
///
/// Every request acquires a token from the credential (served from its
/// cache when valid) and attaches it as a bearer header.
#[derive(Debug)]
pub struct GraphClient {
    http: reqwest::Client,
    credential: Credential,
    base: String,
}

impl GraphClient {
    pub fn new(credential: Credential) -> Self {
        Self::with_base(credential, GRAPH_BASE)
    }

    /// Client against an alternate base URL. Used by tests.
    pub(crate) fn with_base(credential: Credential, base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            credential,
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Force a token acquisition/refresh and return the bearer string.
    pub async fn token(&self) -> Result<String> {
        self.credential.token().await
    }

    /// GET a Graph path (with query string already attached).
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let token = self.credential.token().await?;
        let url = format!("{}{}", self.base, path);
        tracing::debug!("Graph GET {}", url);

        let resp = self.http.get(&url).bearer_auth(&token).send().await?;
        check_response(resp, &url).await
    }

    /// POST a JSON body to a Graph path.
    pub async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<reqwest::Response> {
        let token = self.credential.token().await?;
        let url = format!("{}{}", self.base, path);
        tracing::debug!("Graph POST {}", url);

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(body)
            .send()
            .await?;
        check_response(resp, &url).await
    }
}

/// Turn a non-success reply into a Service error carrying status and body.
async fn check_response(resp: reqwest::Response, url: &str) -> Result<reqwest::Response> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Service {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        });
    }
    Ok(resp)
}
