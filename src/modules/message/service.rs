/// Message Service
///
/// The message ledger:
/// - appends message rows (inbound and outbound)
/// - keeps contact/conversation freshness fields current, best-effort
/// - moves the current status forward while logging every transition
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::contact::repository::ContactRepository;
use crate::modules::conversation::repository::ConversationRepository;
use crate::modules::message::model::{NewMessage, NewMessageEvent};
use crate::modules::message::repository::MessageRepository;
use crate::modules::message::schema::{MessageEntity, MessageEventEntity, MessageStatus};

#[derive(Clone)]
pub struct MessageService {
    message_repo: Arc<dyn MessageRepository + Send + Sync>,
    contact_repo: Arc<dyn ContactRepository + Send + Sync>,
    conversation_repo: Arc<dyn ConversationRepository + Send + Sync>,
}

impl MessageService {
    pub fn with_dependencies(
        message_repo: Arc<dyn MessageRepository + Send + Sync>,
        contact_repo: Arc<dyn ContactRepository + Send + Sync>,
        conversation_repo: Arc<dyn ConversationRepository + Send + Sync>,
    ) -> Self {
        MessageService { message_repo, contact_repo, conversation_repo }
    }

    /// Appends a message row.
    ///
    /// Only the insert decides the outcome. The freshness touch runs detached
    /// and its failure is logged, never returned.
    pub async fn record(&self, message: NewMessage) -> Result<MessageEntity, error::SystemError> {
        let message = self.message_repo.create(&message).await?;

        tracing::info!(
            message_id = %message.id,
            conversation_id = %message.conversation_id,
            direction = ?message.direction,
            status = ?message.status,
            "message recorded"
        );

        self.touch_freshness(&message);

        Ok(message)
    }

    fn touch_freshness(&self, message: &MessageEntity) {
        let contact_repo = self.contact_repo.clone();
        let conversation_repo = self.conversation_repo.clone();
        let contact_id = message.contact_id;
        let conversation_id = message.conversation_id;

        tokio::spawn(async move {
            let now = chrono::Utc::now();
            if let Err(e) = contact_repo.touch_last_message_at(&contact_id, now).await {
                tracing::warn!(%contact_id, error = %e, "failed to touch contact last_message_at");
            }
            if let Err(e) = conversation_repo.update_timestamp(&conversation_id).await {
                tracing::warn!(%conversation_id, error = %e, "failed to touch conversation");
            }
        });
    }

    /// Moves the current status and appends one audit event.
    ///
    /// The projection update is the contract; a failed event insert leaves a
    /// gap in the history but does not fail the call.
    pub async fn update_status(
        &self,
        message_id: Uuid,
        status: MessageStatus,
        raw_payload: Option<serde_json::Value>,
    ) -> Result<MessageEntity, error::SystemError> {
        let message = self
            .message_repo
            .update_status(&message_id, status)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Message not found"))?;

        let event = NewMessageEvent { message_id, status, raw_payload };
        if let Err(e) = self.message_repo.create_event(&event).await {
            tracing::warn!(%message_id, ?status, error = %e, "failed to append message event");
        }

        tracing::info!(%message_id, ?status, "message status updated");

        Ok(message)
    }

    pub async fn events(
        &self,
        message_id: Uuid,
    ) -> Result<Vec<MessageEventEntity>, error::SystemError> {
        if self.message_repo.find_by_id(&message_id).await?.is_none() {
            return Err(error::SystemError::not_found("Message not found"));
        }

        self.message_repo.find_events(&message_id).await
    }
}
