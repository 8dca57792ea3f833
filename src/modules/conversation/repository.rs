use uuid::Uuid;

use crate::{
    api::error,
    modules::conversation::{
        model::ConversationDetail,
        schema::{ConversationEntity, ConversationStatus},
    },
};

#[async_trait::async_trait]
pub trait ConversationRepository {
    async fn find_by_id(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError>;

    /// The open or waiting conversation of a contact, if any.
    async fn find_active_by_contact(
        &self,
        contact_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError>;

    /// Inserts an open conversation unless the contact already has an active one.
    async fn create_open_if_absent(
        &self,
        contact_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError>;

    async fn update_timestamp(&self, conversation_id: &Uuid) -> Result<(), error::SystemError>;

    async fn close(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError>;

    /// Conversations with their contact, most recently active first.
    async fn find_details(
        &self,
        status: Option<ConversationStatus>,
        limit: usize,
    ) -> Result<Vec<ConversationDetail>, error::SystemError>;
}
