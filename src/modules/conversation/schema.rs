use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "conversation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Open,
    Waiting,
    Closed,
}

impl ConversationStatus {
    /// Open and waiting conversations count against the one-per-contact limit.
    pub fn is_active(self) -> bool {
        matches!(self, ConversationStatus::Open | ConversationStatus::Waiting)
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConversationEntity {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub assigned_agent_id: Option<Uuid>,
    pub status: ConversationStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
