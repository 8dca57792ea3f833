use uuid::Uuid;

use crate::api::error;
use crate::modules::message::model::{MessageQuery, NewMessage, NewMessageEvent};
use crate::modules::message::schema::{MessageEntity, MessageEventEntity, MessageStatus};

#[async_trait::async_trait]
pub trait MessageRepository {
    async fn create(&self, message: &NewMessage) -> Result<MessageEntity, error::SystemError>;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<MessageEntity>, error::SystemError>;

    /// Newest first, strictly older than the query cursor when one is given.
    async fn find_by_query(
        &self,
        query: &MessageQuery,
        limit: usize,
    ) -> Result<Vec<MessageEntity>, error::SystemError>;

    async fn update_status(
        &self,
        id: &Uuid,
        status: MessageStatus,
    ) -> Result<Option<MessageEntity>, error::SystemError>;

    async fn create_event(
        &self,
        event: &NewMessageEvent,
    ) -> Result<MessageEventEntity, error::SystemError>;

    async fn find_events(
        &self,
        message_id: &Uuid,
    ) -> Result<Vec<MessageEventEntity>, error::SystemError>;
}
