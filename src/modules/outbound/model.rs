use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::message::schema::MessageType;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendTextRequest {
    #[serde(alias = "conversationId")]
    pub conversation_id: Uuid,
    #[validate(length(min = 1, max = 4096, message = "text must be between 1 and 4096 characters"))]
    pub text: String,
}

/// A media send collected from a multipart form.
#[derive(Debug, Clone)]
pub struct SendMediaRequest {
    pub conversation_id: Uuid,
    pub _type: MessageType,
    pub text: Option<String>,
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutboundReceipt {
    pub message_id: Uuid,
    pub conversation_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    pub api_response: serde_json::Value,
}
