use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct NotifyRequest {
    pub message: String,
}

impl NotifyRequest {
    pub fn validate(&self) -> Result<&str, &'static str> {
        let message = self.message.trim();
        if message.is_empty() {
            return Err("message is required");
        }
        if message.len() > 1000 {
            return Err("message must be <= 1000 chars");
        }
        Ok(message)
    }
}

#[derive(Debug, Serialize)]
pub struct NotifyResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String, // encoded
    pub message: String,
    pub created_at: DateTime<Utc>,
}
