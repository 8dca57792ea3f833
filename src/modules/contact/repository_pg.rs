use uuid::Uuid;

use crate::{
    api::error,
    modules::contact::{model::NewContact, repository::ContactRepository, schema::ContactEntity},
};

#[derive(Clone)]
pub struct ContactRepositoryPg {
    pool: sqlx::PgPool,
}

impl ContactRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ContactRepository for ContactRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ContactEntity>, error::SystemError> {
        let contact = sqlx::query_as::<_, ContactEntity>("SELECT * FROM contacts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(contact)
    }

    async fn find_by_number(
        &self,
        number: &str,
    ) -> Result<Option<ContactEntity>, error::SystemError> {
        let contact =
            sqlx::query_as::<_, ContactEntity>("SELECT * FROM contacts WHERE number = $1")
                .bind(number)
                .fetch_optional(&self.pool)
                .await?;
        Ok(contact)
    }

    async fn create_if_absent(
        &self,
        contact: &NewContact,
    ) -> Result<Option<ContactEntity>, error::SystemError> {
        let id = Uuid::now_v7();
        // contacts_number_key backs this; a racing insert yields no row instead of 23505
        let contact = sqlx::query_as::<_, ContactEntity>(
            r#"
            INSERT INTO contacts (id, number, name)
            VALUES ($1, $2, $3)
            ON CONFLICT (number) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&contact.number)
        .bind(&contact.name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(contact)
    }

    async fn touch_last_message_at(
        &self,
        id: &Uuid,
        at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), error::SystemError> {
        sqlx::query("UPDATE contacts SET last_message_at = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
