//! Diagnostic probe against /me/onenote/notebooks
//!
//! This is the one deliberately degraded entry point: every failure is
//! logged and swallowed, and the caller gets an empty list instead of an
//! error. Useful for poking at a tenant without taking the process down;
//! never use it where failures must be visible.

use serde::Deserialize;

use super::client::GraphClient;
use crate::models::Page;

/// A OneNote notebook, name only.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notebook {
    pub display_name: Option<String>,
}

/// List the user's notebooks, returning an empty list on any failure.
pub async fn try_list_notebooks(client: &GraphClient) -> Vec<Notebook> {
    match list_notebooks(client).await {
        Ok(page) => page.value,
        Err(e) => {
            tracing::warn!("Notebook probe failed: {}", e);
            Vec::new()
        }
    }
}

async fn list_notebooks(client: &GraphClient) -> crate::error::Result<Page<Notebook>> {
    let resp = client.get("/me/onenote/notebooks").await?;
    Ok(resp.json().await?)
}
