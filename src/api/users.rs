//! Tenant directory operations (/users)

use super::client::GraphClient;
use crate::error::Result;
use crate::models::{DirectoryUser, Page};

const PAGE_SIZE: usize = 25;

/// Request path for the directory listing: at most 25 users, sorted by
/// display name ascending, both applied by the service.
fn users_path() -> String {
    format!(
        "/users?$select=displayName,id,mail&$top={}&$orderby=displayName",
        PAGE_SIZE
    )
}

/// Fetch the first page of users in the tenant directory.
pub async fn list_users(client: &GraphClient) -> Result<Page<DirectoryUser>> {
    let resp = client.get(&users_path()).await?;
    Ok(resp.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_users_request_is_truncated_and_sorted_service_side() {
        let path = users_path();
        assert!(path.starts_with("/users?"));
        assert!(path.contains("$top=25"));
        assert!(path.contains("$orderby=displayName"));
        assert!(path.contains("$select=displayName,id,mail"));
    }
}
