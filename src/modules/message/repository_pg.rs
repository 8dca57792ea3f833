use uuid::Uuid;

use crate::{
    api::error,
    modules::message::{
        model::{MessageQuery, NewMessage, NewMessageEvent},
        repository::MessageRepository,
        schema::{MessageEntity, MessageEventEntity, MessageStatus},
    },
};

#[derive(Clone)]
pub struct MessageRepositoryPg {
    pool: sqlx::PgPool,
}

impl MessageRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MessageRepository for MessageRepositoryPg {
    async fn create(&self, message: &NewMessage) -> Result<MessageEntity, error::SystemError> {
        let id = Uuid::now_v7();
        let message = sqlx::query_as::<_, MessageEntity>(
            r#"
            INSERT INTO messages
                (id, contact_id, conversation_id, direction, type, text, media_url, api_file_url, status, raw_payload)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(message.contact_id)
        .bind(message.conversation_id)
        .bind(message.direction)
        .bind(message._type)
        .bind(&message.text)
        .bind(&message.media_url)
        .bind(&message.api_file_url)
        .bind(message.status)
        .bind(&message.raw_payload)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<MessageEntity>, error::SystemError> {
        let message = sqlx::query_as::<_, MessageEntity>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(message)
    }

    async fn find_by_query(
        &self,
        query: &MessageQuery,
        limit: usize,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        // has index on (conversation_id, created_at DESC)

        let messages = if let Some(created_at) = query.created_at {
            sqlx::query_as::<_, MessageEntity>(
                "SELECT * FROM messages WHERE conversation_id = $1 AND created_at < $2 ORDER BY created_at DESC LIMIT $3",
            )
            .bind(query.conversation_id)
            .bind(created_at)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, MessageEntity>(
                "SELECT * FROM messages WHERE conversation_id = $1 ORDER BY created_at DESC LIMIT $2",
            )
            .bind(query.conversation_id)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(messages)
    }

    async fn update_status(
        &self,
        id: &Uuid,
        status: MessageStatus,
    ) -> Result<Option<MessageEntity>, error::SystemError> {
        let message = sqlx::query_as::<_, MessageEntity>(
            "UPDATE messages SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }

    async fn create_event(
        &self,
        event: &NewMessageEvent,
    ) -> Result<MessageEventEntity, error::SystemError> {
        let id = Uuid::now_v7();
        let event = sqlx::query_as::<_, MessageEventEntity>(
            r#"
            INSERT INTO message_events (id, message_id, status, raw_payload)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(event.message_id)
        .bind(event.status)
        .bind(&event.raw_payload)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    async fn find_events(
        &self,
        message_id: &Uuid,
    ) -> Result<Vec<MessageEventEntity>, error::SystemError> {
        let events = sqlx::query_as::<_, MessageEventEntity>(
            "SELECT * FROM message_events WHERE message_id = $1 ORDER BY timestamp ASC, id ASC",
        )
        .bind(message_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}
