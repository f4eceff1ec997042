//! In-memory access token cache

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// An acquired access token with its expiry instant.
#[derive(Debug, Clone)]
pub struct CachedToken {
    pub token: String,
    pub expires_at: Option<u64>,
}

impl CachedToken {
    pub fn new(token: String, expires_in: Option<Duration>) -> Self {
        let expires_at = expires_in.map(|d| now_secs() + d.as_secs());
        Self { token, expires_at }
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            // Consider expired if less than 5 minutes remaining
            Some(exp) => now_secs() + 300 >= exp,
            None => false,
        }
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_is_not_expired() {
        let t = CachedToken::new("tok".into(), Some(Duration::from_secs(3600)));
        assert!(!t.is_expired());
    }

    #[test]
    fn test_token_inside_skew_window_is_expired() {
        // 60s remaining is within the 5 minute early-expiry window
        let t = CachedToken::new("tok".into(), Some(Duration::from_secs(60)));
        assert!(t.is_expired());
    }

    #[test]
    fn test_token_without_expiry_never_expires() {
        let t = CachedToken::new("tok".into(), None);
        assert!(!t.is_expired());
    }
}
