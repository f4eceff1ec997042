//! Error taxonomy for Graph client operations

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Which credential mode an operation or handle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Delegated identity of the signed-in user (device code flow).
    User,
    /// Application identity (client credentials flow).
    AppOnly,
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::User => write!(f, "user"),
            AuthMode::AppOnly => write!(f, "app-only"),
        }
    }
}

/// Errors surfaced by the Graph facade.
///
/// Transport and auth failures pass through unmodified; the facade adds no
/// retry or translation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Settings file absent, unparsable, or missing a required field.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Operation invoked before its client handle was initialized.
    /// A caller bug, not a recoverable runtime condition.
    #[error("Graph has not been initialized for {0} auth")]
    NotInitialized(AuthMode),

    /// Token acquisition failed in the underlying OAuth2 flow.
    #[error("token acquisition failed: {0}")]
    Auth(String),

    /// Network-level failure from the underlying HTTP client.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success reply from the remote service.
    #[error("HTTP {status} for {url}: {body}")]
    Service {
        status: u16,
        url: String,
        body: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_initialized_display() {
        let err = Error::NotInitialized(AuthMode::User);
        assert_eq!(
            err.to_string(),
            "Graph has not been initialized for user auth"
        );
        let err = Error::NotInitialized(AuthMode::AppOnly);
        assert!(err.to_string().contains("app-only"));
    }

    #[test]
    fn test_service_display_carries_status_and_url() {
        let err = Error::Service {
            status: 403,
            url: "https://graph.microsoft.com/v1.0/users".into(),
            body: "Insufficient privileges".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("/v1.0/users"));
    }
}
