use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::modules::{
    contact::schema::ContactEntity,
    conversation::schema::{ConversationEntity, ConversationStatus},
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MessageQueryRequest {
    #[validate(range(min = 1, max = 200, message = "limit must be between 1 and 200"))]
    pub limit: Option<usize>,
    /// RFC 3339 `created_at` of the oldest message already seen.
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConversationQueryRequest {
    pub status: Option<ConversationStatus>,
    #[validate(range(min = 1, max = 200, message = "limit must be between 1 and 200"))]
    pub limit: Option<usize>,
}

/// Flat row of a conversation joined with its contact.
#[derive(Debug, Clone, FromRow)]
pub struct ConversationDetailRaw {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub assigned_agent_id: Option<Uuid>,
    pub status: ConversationStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,

    pub contact_number: String,
    pub contact_name: Option<String>,
    pub contact_last_message_at: Option<chrono::DateTime<chrono::Utc>>,
    pub contact_created_at: chrono::DateTime<chrono::Utc>,
    pub contact_updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationDetail {
    #[serde(flatten)]
    pub conversation: ConversationEntity,
    pub contact: ContactEntity,
}

impl From<ConversationDetailRaw> for ConversationDetail {
    fn from(raw: ConversationDetailRaw) -> Self {
        ConversationDetail {
            conversation: ConversationEntity {
                id: raw.id,
                contact_id: raw.contact_id,
                assigned_agent_id: raw.assigned_agent_id,
                status: raw.status,
                created_at: raw.created_at,
                updated_at: raw.updated_at,
            },
            contact: ContactEntity {
                id: raw.contact_id,
                number: raw.contact_number,
                name: raw.contact_name,
                last_message_at: raw.contact_last_message_at,
                created_at: raw.contact_created_at,
                updated_at: raw.contact_updated_at,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationDetail>,
}
