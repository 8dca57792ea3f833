/// Ingestion Pipeline
///
/// received -> validated -> (media relayed | skipped | failed) -> persisted -> acknowledged,
/// or rejected / ignored. Only validation and persistence failures reach the caller.
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;
use validator::Validate;

use crate::api::error;
use crate::modules::contact::model::normalize_number;
use crate::modules::contact::service::ContactService;
use crate::modules::conversation::service::ConversationService;
use crate::modules::media::model::MediaFolder;
use crate::modules::media::service::BlobRelay;
use crate::modules::message::model::NewMessage;
use crate::modules::message::schema::{MessageDirection, MessageEntity, MessageStatus};
use crate::modules::message::service::MessageService;
use crate::modules::webhook::model::{classify, GatewayWebhook, StatusDelivery};

#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Persisted { message_id: Uuid, conversation_id: Uuid },
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
enum MediaRelay {
    Relayed(String),
    Skipped,
    Failed,
}

#[derive(Clone)]
pub struct IngestionService {
    contact_svc: ContactService,
    conversation_svc: ConversationService,
    message_svc: MessageService,
    relay: BlobRelay,
    relay_timeout: Duration,
    deadline: Duration,
}

impl IngestionService {
    pub fn with_dependencies(
        contact_svc: ContactService,
        conversation_svc: ConversationService,
        message_svc: MessageService,
        relay: BlobRelay,
    ) -> Self {
        IngestionService {
            contact_svc,
            conversation_svc,
            message_svc,
            relay,
            relay_timeout: Duration::from_secs(10),
            deadline: Duration::from_secs(25),
        }
    }

    /// `relay_timeout` must stay below `deadline`.
    pub fn with_timeouts(mut self, relay_timeout: Duration, deadline: Duration) -> Self {
        self.relay_timeout = relay_timeout.min(deadline / 2);
        self.deadline = deadline;
        self
    }

    /// Processes one message delivery. `raw` is stored verbatim on the message row.
    pub async fn ingest(
        &self,
        raw: serde_json::Value,
    ) -> Result<IngestOutcome, error::SystemError> {
        match tokio::time::timeout(self.deadline, self.process(raw)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::error!(deadline_ms = self.deadline.as_millis() as u64, "webhook deadline exceeded");
                Err(error::SystemError::internal("webhook deadline exceeded"))
            }
        }
    }

    async fn process(&self, raw: serde_json::Value) -> Result<IngestOutcome, error::SystemError> {
        let payload = GatewayWebhook::deserialize(&raw)
            .map_err(|e| error::SystemError::bad_request(format!("Invalid payload: {e}")))?;
        payload.validate().map_err(|e| error::SystemError::bad_request(e.to_string()))?;

        let message = &payload.body.message;
        let chat = &payload.body.chat;
        tracing::debug!(
            event_type = ?payload.event_type,
            chatid = %message.chatid,
            sender = ?message.sender,
            "webhook delivery received"
        );

        if message.from_me {
            tracing::debug!(chatid = %message.chatid, "ignoring message sent by us");
            return Ok(IngestOutcome::Ignored);
        }

        let number = normalize_number(&message.chatid)?;
        let message_type = classify(message.message_type.as_deref(), message.media_type.as_deref());

        let api_file_url = message.media_url();
        let media_url = match &api_file_url {
            Some(url) => match self.relay_media(url, MediaFolder::from(message_type)).await {
                MediaRelay::Relayed(stored) => Some(stored),
                MediaRelay::Skipped | MediaRelay::Failed => None,
            },
            None => None,
        };

        let contact = self.contact_svc.resolve(&number, chat.display_name()).await?;
        let conversation = self.conversation_svc.route_for(contact.id).await?;

        let text = message.text.clone().filter(|t| !t.is_empty());

        let recorded = self
            .message_svc
            .record(NewMessage {
                contact_id: contact.id,
                conversation_id: conversation.id,
                direction: MessageDirection::Inbound,
                _type: message_type,
                text,
                media_url,
                api_file_url,
                status: MessageStatus::Delivered,
                raw_payload: Some(raw),
            })
            .await?;

        tracing::info!(
            message_id = %recorded.id,
            conversation_id = %conversation.id,
            contact_id = %contact.id,
            message_type = message_type.as_str(),
            "inbound message ingested"
        );

        Ok(IngestOutcome::Persisted { message_id: recorded.id, conversation_id: conversation.id })
    }

    async fn relay_media(&self, url: &str, folder: MediaFolder) -> MediaRelay {
        match tokio::time::timeout(self.relay_timeout, self.relay.download_and_upload(url, folder))
            .await
        {
            Ok(Ok(stored)) => MediaRelay::Relayed(stored),
            Ok(Err(e)) => {
                tracing::warn!(%url, error = %e, "media relay failed, continuing without a copy");
                MediaRelay::Failed
            }
            Err(_) => {
                tracing::warn!(
                    %url,
                    timeout_ms = self.relay_timeout.as_millis() as u64,
                    "media relay timed out, continuing without a copy"
                );
                MediaRelay::Skipped
            }
        }
    }

    /// Processes one status delivery; the whole body becomes the event payload.
    pub async fn ingest_status(
        &self,
        raw: serde_json::Value,
    ) -> Result<MessageEntity, error::SystemError> {
        let delivery = StatusDelivery::deserialize(&raw)
            .map_err(|e| error::SystemError::bad_request(format!("Invalid payload: {e}")))?;

        let (Some(message_id), Some(status)) = (delivery.message_id, delivery.status) else {
            return Err(error::SystemError::bad_request(
                "Invalid payload: missing message_id or status",
            ));
        };

        self.message_svc.update_status(message_id, status, Some(raw)).await
    }
}
