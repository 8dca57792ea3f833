use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "message_direction", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageDirection {
    Inbound,
    Outbound,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "message_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Image,
    Audio,
    Document,
    Video,
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::Image => "image",
            MessageType::Audio => "audio",
            MessageType::Document => "document",
            MessageType::Video => "video",
        }
    }
}

impl std::str::FromStr for MessageType {
    type Err = crate::api::error::SystemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "text" => Ok(MessageType::Text),
            "image" => Ok(MessageType::Image),
            "audio" => Ok(MessageType::Audio),
            "document" => Ok(MessageType::Document),
            "video" => Ok(MessageType::Video),
            other => Err(crate::api::error::SystemError::bad_request(format!(
                "Unknown message type '{other}'"
            ))),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "message_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Sent,
    Delivered,
    Read,
    Error,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MessageEntity {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub conversation_id: Uuid,
    pub direction: MessageDirection,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub _type: MessageType,
    pub text: Option<String>,
    pub media_url: Option<String>,
    pub api_file_url: Option<String>,
    pub status: MessageStatus,
    pub raw_payload: Option<serde_json::Value>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MessageEventEntity {
    pub id: Uuid,
    pub message_id: Uuid,
    pub status: MessageStatus,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub raw_payload: Option<serde_json::Value>,
}
