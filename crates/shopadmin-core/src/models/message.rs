use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    #[serde(rename = "_id")]
    pub id: i64,
    #[serde(default)]
    pub user: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub admin_reply: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ContactMessage {
    pub fn sender(&self) -> &str {
        self.email.as_deref().filter(|e| !e.is_empty()).unwrap_or("anonymous")
    }

    pub fn has_reply(&self) -> bool {
        self.admin_reply.as_deref().map(|r| !r.trim().is_empty()).unwrap_or(false)
    }
}
