use uuid::Uuid;

use crate::{
    api::error,
    modules::conversation::{
        model::{ConversationDetail, ConversationDetailRaw},
        repository::ConversationRepository,
        schema::{ConversationEntity, ConversationStatus},
    },
};

#[derive(Clone)]
pub struct ConversationPgRepository {
    pool: sqlx::PgPool,
}

impl ConversationPgRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ConversationRepository for ConversationPgRepository {
    async fn find_by_id(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError> {
        let conversation =
            sqlx::query_as::<_, ConversationEntity>("SELECT * FROM conversations WHERE id = $1")
                .bind(conversation_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(conversation)
    }

    async fn find_active_by_contact(
        &self,
        contact_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError> {
        let conversation = sqlx::query_as::<_, ConversationEntity>(
            r#"
            SELECT *
            FROM conversations
            WHERE contact_id = $1
            AND status IN ('open', 'waiting')
            LIMIT 1
            "#,
        )
        .bind(contact_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conversation)
    }

    async fn create_open_if_absent(
        &self,
        contact_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError> {
        let id = Uuid::now_v7();
        // conversations_active_contact_key is partial, so the conflict target repeats its predicate
        let conversation = sqlx::query_as::<_, ConversationEntity>(
            r#"
            INSERT INTO conversations (id, contact_id, status)
            VALUES ($1, $2, 'open')
            ON CONFLICT (contact_id) WHERE status IN ('open', 'waiting') DO NOTHING
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(contact_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conversation)
    }

    async fn update_timestamp(&self, conversation_id: &Uuid) -> Result<(), error::SystemError> {
        sqlx::query("UPDATE conversations SET updated_at = NOW() WHERE id = $1")
            .bind(conversation_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn close(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError> {
        let conversation = sqlx::query_as::<_, ConversationEntity>(
            r#"
            UPDATE conversations
            SET status = 'closed', assigned_agent_id = NULL, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conversation)
    }

    async fn find_details(
        &self,
        status: Option<ConversationStatus>,
        limit: usize,
    ) -> Result<Vec<ConversationDetail>, error::SystemError> {
        let rows = sqlx::query_as::<_, ConversationDetailRaw>(
            r#"
            SELECT
                c.id,
                c.contact_id,
                c.assigned_agent_id,
                c.status,
                c.created_at,
                c.updated_at,
                ct.number AS contact_number,
                ct.name AS contact_name,
                ct.last_message_at AS contact_last_message_at,
                ct.created_at AS contact_created_at,
                ct.updated_at AS contact_updated_at
            FROM conversations c
            JOIN contacts ct ON ct.id = c.contact_id
            WHERE ($1::conversation_status IS NULL OR c.status = $1)
            ORDER BY c.updated_at DESC, c.id DESC
            LIMIT $2
            "#,
        )
        .bind(status)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ConversationDetail::from).collect())
    }
}
