use uuid::Uuid;

use crate::{
    api::error,
    modules::contact::{model::NewContact, schema::ContactEntity},
};

#[async_trait::async_trait]
pub trait ContactRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ContactEntity>, error::SystemError>;

    async fn find_by_number(
        &self,
        number: &str,
    ) -> Result<Option<ContactEntity>, error::SystemError>;

    /// Inserts unless the number is already taken; `None` means another writer won.
    async fn create_if_absent(
        &self,
        contact: &NewContact,
    ) -> Result<Option<ContactEntity>, error::SystemError>;

    async fn touch_last_message_at(
        &self,
        id: &Uuid,
        at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), error::SystemError>;
}
