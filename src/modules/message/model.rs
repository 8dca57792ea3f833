use serde::Serialize;
use uuid::Uuid;

use crate::modules::message::schema::{
    MessageDirection, MessageEntity, MessageStatus, MessageType,
};

/// Everything the recorder needs to append one message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub contact_id: Uuid,
    pub conversation_id: Uuid,
    pub direction: MessageDirection,
    pub _type: MessageType,
    pub text: Option<String>,
    pub media_url: Option<String>,
    pub api_file_url: Option<String>,
    pub status: MessageStatus,
    pub raw_payload: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct NewMessageEvent {
    pub message_id: Uuid,
    pub status: MessageStatus,
    pub raw_payload: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct MessageQuery {
    pub conversation_id: Uuid,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetMessageResponse {
    pub messages: Vec<MessageEntity>,
    pub cursor: Option<String>,
}
