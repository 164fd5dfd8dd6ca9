use crate::models::{ContactMessage, ListQuery, Page};

use super::client::ApiRequest;
use super::{ApiClient, ApiError};

/// Messages are listed twenty to a page
pub const MESSAGE_PAGE_SIZE: u32 = 20;

impl ApiClient {
    pub async fn list_messages(&self, page: u32) -> Result<Page<ContactMessage>, ApiError> {
        let query = ListQuery::new(page, MESSAGE_PAGE_SIZE);
        self.fetch(ApiRequest::get("/api/messages/").params(query.params()))
            .await
    }

    pub async fn get_message(&self, id: i64) -> Result<ContactMessage, ApiError> {
        self.fetch(ApiRequest::get(format!("/api/messages/{}/", id))).await
    }

    /// Fetch a message, marking it read on first open
    pub async fn open_message(&self, id: i64) -> Result<ContactMessage, ApiError> {
        let message = self.get_message(id).await?;
        if message.is_read {
            return Ok(message);
        }
        self.fetch(
            ApiRequest::patch(format!("/api/messages/{}/", id))
                .json(&serde_json::json!({ "is_read": true }))?,
        )
        .await
    }

    /// Store the admin's reply; replying also marks the message read
    pub async fn reply_to_message(&self, id: i64, reply: &str) -> Result<ContactMessage, ApiError> {
        if reply.trim().is_empty() {
            return Err(ApiError::Validation("Reply cannot be empty".to_string()));
        }
        self.fetch(
            ApiRequest::patch(format!("/api/messages/{}/", id))
                .json(&serde_json::json!({ "admin_reply": reply, "is_read": true }))?,
        )
        .await
    }
}
