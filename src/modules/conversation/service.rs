use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::constants::{DEFAULT_CONVERSATION_PAGE, MAX_CONVERSATION_PAGE};
use crate::modules::conversation::model::ConversationDetail;
use crate::modules::conversation::repository::ConversationRepository;
use crate::modules::conversation::schema::{ConversationEntity, ConversationStatus};
use crate::modules::message::model::MessageQuery;
use crate::modules::message::repository::MessageRepository;
use crate::modules::message::schema::MessageEntity;

const ROUTE_ATTEMPTS: usize = 3;

/// Conversation router: keeps a single open/waiting conversation per contact.
#[derive(Clone)]
pub struct ConversationService {
    conversation_repo: Arc<dyn ConversationRepository + Send + Sync>,
    message_repo: Arc<dyn MessageRepository + Send + Sync>,
}

impl ConversationService {
    pub fn with_dependencies(
        conversation_repo: Arc<dyn ConversationRepository + Send + Sync>,
        message_repo: Arc<dyn MessageRepository + Send + Sync>,
    ) -> Self {
        ConversationService { conversation_repo, message_repo }
    }

    /// Returns the contact's active conversation, opening one if there is none.
    ///
    /// A lost insert race re-reads the winner's row. If that row was closed
    /// in between, the insert is tried again.
    pub async fn route_for(&self, contact_id: Uuid) -> Result<ConversationEntity, error::SystemError> {
        for attempt in 1..=ROUTE_ATTEMPTS {
            if let Some(conversation) =
                self.conversation_repo.find_active_by_contact(&contact_id).await?
            {
                return Ok(conversation);
            }

            match self.conversation_repo.create_open_if_absent(&contact_id).await {
                Ok(Some(conversation)) => {
                    tracing::info!(
                        conversation_id = %conversation.id,
                        %contact_id,
                        "conversation opened"
                    );
                    return Ok(conversation);
                }
                Ok(None) => {}
                Err(e) if e.is_conflict() => {}
                Err(e) => return Err(e),
            }

            tracing::debug!(%contact_id, attempt, "conversation insert lost a race, re-fetching");
        }

        Err(error::SystemError::internal(format!(
            "could not settle an active conversation for contact {contact_id}"
        )))
    }

    pub async fn get_by_id(
        &self,
        conversation_id: Uuid,
    ) -> Result<ConversationEntity, error::SystemError> {
        self.conversation_repo
            .find_by_id(&conversation_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Conversation not found"))
    }

    pub async fn list(
        &self,
        status: Option<ConversationStatus>,
        limit: Option<usize>,
    ) -> Result<Vec<ConversationDetail>, error::SystemError> {
        let limit = limit.unwrap_or(DEFAULT_CONVERSATION_PAGE).clamp(1, MAX_CONVERSATION_PAGE);
        self.conversation_repo.find_details(status, limit).await
    }

    /// Closing frees the contact's active slot; the next inbound message opens a new one.
    pub async fn close(
        &self,
        conversation_id: Uuid,
    ) -> Result<ConversationEntity, error::SystemError> {
        let conversation = self
            .conversation_repo
            .close(&conversation_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Conversation not found"))?;

        tracing::info!(%conversation_id, "conversation closed");

        Ok(conversation)
    }

    /// Newest-first page of a conversation's messages plus the cursor for the next page.
    pub async fn get_messages(
        &self,
        conversation_id: Uuid,
        limit: Option<usize>,
        cursor: Option<String>,
    ) -> Result<(Vec<MessageEntity>, Option<String>), error::SystemError> {
        self.get_by_id(conversation_id).await?;

        let limit = limit.unwrap_or(DEFAULT_CONVERSATION_PAGE).clamp(1, MAX_CONVERSATION_PAGE);

        let created_at = match cursor {
            Some(c) => Some(
                chrono::DateTime::parse_from_rfc3339(&c)
                    .map_err(|_| error::SystemError::bad_request("Invalid cursor"))?
                    .with_timezone(&chrono::Utc),
            ),
            None => None,
        };

        let messages = self
            .message_repo
            .find_by_query(&MessageQuery { conversation_id, created_at }, limit)
            .await?;

        let next_cursor = if messages.len() == limit {
            messages.last().map(|m| m.created_at.to_rfc3339())
        } else {
            None
        };

        Ok((messages, next_cursor))
    }
}
