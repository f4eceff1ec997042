//! Signed-in user profile (/me)

use super::client::GraphClient;
use crate::error::Result;
use crate::models::User;

/// Fetch the signed-in user's profile, selecting only the fields we show.
pub async fn current_user(client: &GraphClient) -> Result<User> {
    let resp = client
        .get("/me?$select=displayName,mail,userPrincipalName")
        .await?;
    Ok(resp.json().await?)
}
