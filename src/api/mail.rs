//! Mail operations (/me/mailFolders, /me/sendMail)

use super::client::GraphClient;
use crate::error::Result;
use crate::models::{BodyType, EmailAddress, ItemBody, Message, OutgoingMessage, Page, Recipient};

/// Page size requested from the service for inbox listings.
const PAGE_SIZE: usize = 25;

/// Request path for the inbox listing.
///
/// Truncation and ordering are part of the request so the service does the
/// work: at most 25 messages, newest received first.
fn inbox_path() -> String {
    format!(
        "/me/mailFolders/inbox/messages?$select=from,isRead,receivedDateTime,subject&$top={}&$orderby=receivedDateTime DESC",
        PAGE_SIZE
    )
}

/// Fetch the first page of the signed-in user's inbox.
pub async fn inbox(client: &GraphClient) -> Result<Page<Message>> {
    let resp = client.get(&inbox_path()).await?;
    Ok(resp.json().await?)
}

/// Body for a plain-text message to a single recipient, no attachments.
fn send_mail_body(subject: &str, body: &str, recipient: &str) -> serde_json::Value {
    let message = OutgoingMessage {
        subject: subject.to_string(),
        body: ItemBody {
            content_type: BodyType::Text,
            content: body.to_string(),
        },
        to_recipients: vec![Recipient {
            email_address: EmailAddress {
                name: None,
                address: Some(recipient.to_string()),
            },
        }],
    };
    serde_json::json!({ "message": message })
}

/// Submit a plain-text message for delivery to a single recipient.
pub async fn send_mail(
    client: &GraphClient,
    subject: &str,
    body: &str,
    recipient: &str,
) -> Result<()> {
    let payload = send_mail_body(subject, body, recipient);
    client.post_json("/me/sendMail", &payload).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbox_request_is_truncated_and_sorted_service_side() {
        let path = inbox_path();
        assert!(path.starts_with("/me/mailFolders/inbox/messages?"));
        assert!(path.contains("$top=25"));
        assert!(path.contains("$orderby=receivedDateTime DESC"));
        assert!(path.contains("$select=from,isRead,receivedDateTime,subject"));
    }

    #[test]
    fn test_send_mail_body_shape() {
        let payload = send_mail_body("Test", "Body", "a@example.com");
        let message = &payload["message"];

        assert_eq!(message["subject"], "Test");
        assert_eq!(message["body"]["contentType"], "text");
        assert_eq!(message["body"]["content"], "Body");

        let recipients = message["toRecipients"].as_array().unwrap();
        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0]["emailAddress"]["address"], "a@example.com");

        // No attachments field at all
        assert!(message.get("attachments").is_none());
    }
}
