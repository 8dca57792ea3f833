use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::message::schema::{MessageStatus, MessageType};

/// UAZAPI webhook envelope. Only the fields the pipeline reads are typed;
/// the untouched request body is what gets persisted.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GatewayWebhook {
    #[serde(rename = "EventType")]
    pub event_type: Option<String>,
    #[validate(nested)]
    pub body: WebhookBody,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WebhookBody {
    #[validate(nested)]
    pub message: InboundMessage,
    pub chat: InboundChat,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    #[validate(length(min = 1, message = "chatid must not be empty"))]
    pub chatid: String,
    pub sender: Option<String>,
    pub message_type: Option<String>,
    pub media_type: Option<String>,
    pub text: Option<String>,
    #[serde(default)]
    pub from_me: bool,
    /// A string for plain text, an object carrying `URL` for media.
    pub content: Option<serde_json::Value>,
}

impl InboundMessage {
    /// The gateway's own media reference, if any.
    pub fn media_url(&self) -> Option<String> {
        self.content
            .as_ref()?
            .get("URL")?
            .as_str()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundChat {
    pub name: Option<String>,
    #[serde(rename = "wa_contactName")]
    pub wa_contact_name: Option<String>,
}

impl InboundChat {
    /// The contact's saved name, else the chat name. Blank values do not count.
    pub fn display_name(&self) -> Option<&str> {
        fn non_blank(v: &Option<String>) -> Option<&str> {
            v.as_deref().map(str::trim).filter(|n| !n.is_empty())
        }

        non_blank(&self.wa_contact_name).or_else(|| non_blank(&self.name))
    }
}

/// Delivery-status report for a message this system already holds.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusDelivery {
    pub message_id: Option<Uuid>,
    pub status: Option<MessageStatus>,
}

/// Maps the gateway's type hints onto a message type. Unknown hints are text.
pub fn classify(message_type: Option<&str>, media_type: Option<&str>) -> MessageType {
    match (message_type.unwrap_or_default(), media_type.unwrap_or_default()) {
        (_, "ptt" | "audio") | ("AudioMessage", _) => MessageType::Audio,
        ("ImageMessage", _) | (_, "image") => MessageType::Image,
        ("VideoMessage", _) | (_, "video") => MessageType::Video,
        ("DocumentMessage", _) | (_, "document") => MessageType::Document,
        _ => MessageType::Text,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WebhookAck {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored: Option<bool>,
}

impl WebhookAck {
    pub fn ok() -> Self {
        Self { success: true, message_id: None, conversation_id: None, ignored: None }
    }

    pub fn ignored() -> Self {
        Self { ignored: Some(true), ..Self::ok() }
    }

    pub fn persisted(message_id: Uuid, conversation_id: Uuid) -> Self {
        Self { message_id: Some(message_id), conversation_id: Some(conversation_id), ..Self::ok() }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
