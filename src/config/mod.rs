//! Application settings
//!
//! Settings are loaded once at startup from layered TOML files and are
//! read-only afterwards. `settings.toml` is required;
//! `settings.development.toml` optionally overrides individual fields, and
//! the `GRAPH_CLIENT_SECRET` environment variable overrides the client
//! secret so it can stay out of files entirely.

use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};

const SECRET_ENV_VAR: &str = "GRAPH_CLIENT_SECRET";

/// Immutable-after-load app registration settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Application (client) ID of the app registration
    pub client_id: String,
    /// Client secret (app-only auth); may come from the environment
    #[serde(default)]
    pub client_secret: String,
    /// Directory (tenant) ID used for app-only auth
    pub tenant_id: String,
    /// Tenant used for the interactive user sign-in endpoint
    pub auth_tenant: String,
    /// Permission scopes requested for delegated user tokens, in order
    pub graph_user_scopes: Vec<String>,
}

/// Partial settings as they appear in a single layer file.
/// Every field optional so an override file can set just one of them.
#[derive(Debug, Default, Deserialize)]
struct SettingsLayer {
    client_id: Option<String>,
    client_secret: Option<String>,
    tenant_id: Option<String>,
    auth_tenant: Option<String>,
    graph_user_scopes: Option<Vec<String>>,
}

impl SettingsLayer {
    fn overlay(self, over: SettingsLayer) -> SettingsLayer {
        SettingsLayer {
            client_id: over.client_id.or(self.client_id),
            client_secret: over.client_secret.or(self.client_secret),
            tenant_id: over.tenant_id.or(self.tenant_id),
            auth_tenant: over.auth_tenant.or(self.auth_tenant),
            graph_user_scopes: over.graph_user_scopes.or(self.graph_user_scopes),
        }
    }
}

impl Settings {
    /// Get config directory path
    fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "graph-cli", "graph-cli")
            .ok_or_else(|| Error::Configuration("could not determine config directory".into()))?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Load settings from disk. The base file is required; the development
    /// override and the environment secret are optional.
    pub fn load() -> Result<Self> {
        let dir = Self::config_dir()?;
        let base_path = dir.join("settings.toml");
        let dev_path = dir.join("settings.development.toml");

        let base = fs::read_to_string(&base_path).map_err(|e| {
            Error::Configuration(format!("failed to read {}: {}", base_path.display(), e))
        })?;
        let dev = fs::read_to_string(&dev_path).ok();

        let mut settings = Self::parse(&base, dev.as_deref())?;

        if let Ok(secret) = std::env::var(SECRET_ENV_VAR) {
            if !secret.is_empty() {
                settings.client_secret = secret;
            }
        }

        Ok(settings)
    }

    /// Merge the base layer with an optional development override and
    /// validate required fields. Pure so it is testable without a filesystem.
    pub fn parse(base: &str, dev: Option<&str>) -> Result<Self> {
        let base: SettingsLayer = toml::from_str(base)
            .map_err(|e| Error::Configuration(format!("invalid settings.toml: {}", e)))?;

        let merged = match dev {
            Some(dev) => {
                let dev: SettingsLayer = toml::from_str(dev).map_err(|e| {
                    Error::Configuration(format!("invalid settings.development.toml: {}", e))
                })?;
                base.overlay(dev)
            }
            None => base,
        };

        let settings = Settings {
            client_id: required(merged.client_id, "client_id")?,
            client_secret: merged.client_secret.unwrap_or_default(),
            tenant_id: required(merged.tenant_id, "tenant_id")?,
            auth_tenant: required(merged.auth_tenant, "auth_tenant")?,
            graph_user_scopes: merged.graph_user_scopes.unwrap_or_default(),
        };

        if settings.graph_user_scopes.is_empty() {
            return Err(Error::Configuration(
                "settings field 'graph_user_scopes' is missing or empty".into(),
            ));
        }

        Ok(settings)
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::Configuration(format!(
            "settings field '{}' is missing or empty",
            field
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"
        client_id = "app-id"
        client_secret = "shhh"
        tenant_id = "tenant"
        auth_tenant = "common"
        graph_user_scopes = ["user.read", "mail.read", "mail.send"]
    "#;

    #[test]
    fn test_parse_base_only() {
        let s = Settings::parse(BASE, None).unwrap();
        assert_eq!(s.client_id, "app-id");
        assert_eq!(s.auth_tenant, "common");
        assert_eq!(
            s.graph_user_scopes,
            vec!["user.read", "mail.read", "mail.send"]
        );
    }

    #[test]
    fn test_dev_layer_overrides_base() {
        let dev = r#"
            tenant_id = "dev-tenant"
        "#;
        let s = Settings::parse(BASE, Some(dev)).unwrap();
        assert_eq!(s.tenant_id, "dev-tenant");
        // Untouched fields fall through from the base layer
        assert_eq!(s.client_id, "app-id");
        assert_eq!(s.client_secret, "shhh");
    }

    #[test]
    fn test_missing_required_field_fails() {
        let incomplete = r#"
            client_id = "app-id"
            tenant_id = "tenant"
            graph_user_scopes = ["user.read"]
        "#;
        let err = Settings::parse(incomplete, None).unwrap_err();
        match err {
            Error::Configuration(msg) => assert!(msg.contains("auth_tenant")),
            other => panic!("expected Configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_scopes_fail() {
        let no_scopes = r#"
            client_id = "app-id"
            tenant_id = "tenant"
            auth_tenant = "common"
            graph_user_scopes = []
        "#;
        assert!(matches!(
            Settings::parse(no_scopes, None),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_secret_is_optional_in_files() {
        let no_secret = r#"
            client_id = "app-id"
            tenant_id = "tenant"
            auth_tenant = "common"
            graph_user_scopes = ["user.read"]
        "#;
        let s = Settings::parse(no_secret, None).unwrap();
        assert!(s.client_secret.is_empty());
    }

    #[test]
    fn test_garbage_toml_is_configuration_error() {
        assert!(matches!(
            Settings::parse("not = [valid", None),
            Err(Error::Configuration(_))
        ));
    }
}
