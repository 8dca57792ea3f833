//! In-memory repositories for service tests.
//!
//! Every insert enforces the same uniqueness rules as the Postgres schema
//! (`contacts.number`, one open/waiting conversation per contact), so the
//! conflict handling in the services is exercised for real.


use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::contact::{
    model::NewContact, repository::ContactRepository, schema::ContactEntity,
};
use crate::modules::conversation::{
    model::ConversationDetail,
    repository::ConversationRepository,
    schema::{ConversationEntity, ConversationStatus},
};
use crate::modules::message::{
    model::{MessageQuery, NewMessage, NewMessageEvent},
    repository::MessageRepository,
    schema::{MessageEntity, MessageEventEntity, MessageStatus},
};

#[derive(Default)]
pub struct Faults {
    /// Report uniqueness collisions as a 23505-style error instead of "no row".
    pub conflict_as_error: AtomicBool,
    pub fail_touch: AtomicBool,
    pub fail_events: AtomicBool,
    pub fail_message_insert: AtomicBool,
}

#[derive(Default)]
pub struct MemoryStore {
    contacts: Mutex<Vec<ContactEntity>>,
    conversations: Mutex<Vec<ConversationEntity>>,
    messages: Mutex<Vec<MessageEntity>>,
    events: Mutex<Vec<MessageEventEntity>>,
    race_window: bool,
    hide_contact_lookup: AtomicBool,
    pub faults: Faults,
}

fn db_down() -> error::SystemError {
    error::SystemError::DatabaseError("connection refused".into())
}

impl MemoryStore {
    /// Lookups that miss pause before answering, so concurrent callers all
    /// reach the insert path together.
    pub fn with_race_window() -> Self {
        Self { race_window: true, ..Default::default() }
    }

    pub fn hide_next_contact_lookup(&self) {
        self.hide_contact_lookup.store(true, Ordering::SeqCst);
    }

    async fn widen_race(&self) {
        if self.race_window {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn collision<T>(&self) -> Result<Option<T>, error::SystemError> {
        if self.faults.conflict_as_error.load(Ordering::SeqCst) {
            Err(error::SystemError::Conflict(None))
        } else {
            Ok(None)
        }
    }

    pub fn contacts(&self) -> Vec<ContactEntity> {
        self.contacts.lock().unwrap().clone()
    }

    pub fn conversations(&self) -> Vec<ConversationEntity> {
        self.conversations.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<MessageEntity> {
        self.messages.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<MessageEventEntity> {
        self.events.lock().unwrap().clone()
    }

    pub fn insert_contact(&self, number: &str, name: Option<&str>) -> ContactEntity {
        let now = Utc::now();
        let contact = ContactEntity {
            id: Uuid::now_v7(),
            number: number.to_string(),
            name: name.map(str::to_string),
            last_message_at: None,
            created_at: now,
            updated_at: now,
        };
        self.contacts.lock().unwrap().push(contact.clone());
        contact
    }

    pub fn insert_conversation(&self, contact_id: Uuid) -> ConversationEntity {
        let now = Utc::now();
        let conversation = ConversationEntity {
            id: Uuid::now_v7(),
            contact_id,
            assigned_agent_id: None,
            status: ConversationStatus::Open,
            created_at: now,
            updated_at: now,
        };
        self.conversations.lock().unwrap().push(conversation.clone());
        conversation
    }
}

#[async_trait::async_trait]
impl ContactRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ContactEntity>, error::SystemError> {
        Ok(self.contacts.lock().unwrap().iter().find(|c| c.id == *id).cloned())
    }

    async fn find_by_number(
        &self,
        number: &str,
    ) -> Result<Option<ContactEntity>, error::SystemError> {
        if self.hide_contact_lookup.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }
        let found = self.contacts.lock().unwrap().iter().find(|c| c.number == number).cloned();
        if found.is_none() {
            self.widen_race().await;
        }
        Ok(found)
    }

    async fn create_if_absent(
        &self,
        contact: &NewContact,
    ) -> Result<Option<ContactEntity>, error::SystemError> {
        let now = Utc::now();
        {
            let mut contacts = self.contacts.lock().unwrap();
            if !contacts.iter().any(|c| c.number == contact.number) {
                let entity = ContactEntity {
                    id: Uuid::now_v7(),
                    number: contact.number.clone(),
                    name: contact.name.clone(),
                    last_message_at: None,
                    created_at: now,
                    updated_at: now,
                };
                contacts.push(entity.clone());
                return Ok(Some(entity));
            }
        }
        self.collision()
    }

    async fn touch_last_message_at(
        &self,
        id: &Uuid,
        at: chrono::DateTime<Utc>,
    ) -> Result<(), error::SystemError> {
        if self.faults.fail_touch.load(Ordering::SeqCst) {
            return Err(db_down());
        }
        if let Some(contact) = self.contacts.lock().unwrap().iter_mut().find(|c| c.id == *id) {
            contact.last_message_at = Some(at);
            contact.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ConversationRepository for MemoryStore {
    async fn find_by_id(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError> {
        Ok(self.conversations.lock().unwrap().iter().find(|c| c.id == *conversation_id).cloned())
    }

    async fn find_active_by_contact(
        &self,
        contact_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError> {
        let found = self
            .conversations
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.contact_id == *contact_id && c.status.is_active())
            .cloned();
        if found.is_none() {
            self.widen_race().await;
        }
        Ok(found)
    }

    async fn create_open_if_absent(
        &self,
        contact_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError> {
        {
            let mut conversations = self.conversations.lock().unwrap();
            if !conversations.iter().any(|c| c.contact_id == *contact_id && c.status.is_active()) {
                let now = Utc::now();
                let entity = ConversationEntity {
                    id: Uuid::now_v7(),
                    contact_id: *contact_id,
                    assigned_agent_id: None,
                    status: ConversationStatus::Open,
                    created_at: now,
                    updated_at: now,
                };
                conversations.push(entity.clone());
                return Ok(Some(entity));
            }
        }
        self.collision()
    }

    async fn update_timestamp(&self, conversation_id: &Uuid) -> Result<(), error::SystemError> {
        if self.faults.fail_touch.load(Ordering::SeqCst) {
            return Err(db_down());
        }
        if let Some(c) =
            self.conversations.lock().unwrap().iter_mut().find(|c| c.id == *conversation_id)
        {
            c.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn close(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError> {
        let mut conversations = self.conversations.lock().unwrap();
        let Some(c) = conversations.iter_mut().find(|c| c.id == *conversation_id) else {
            return Ok(None);
        };
        c.status = ConversationStatus::Closed;
        c.assigned_agent_id = None;
        c.updated_at = Utc::now();
        Ok(Some(c.clone()))
    }

    async fn find_details(
        &self,
        status: Option<ConversationStatus>,
        limit: usize,
    ) -> Result<Vec<ConversationDetail>, error::SystemError> {
        let mut conversations: Vec<_> = self
            .conversations()
            .into_iter()
            .filter(|c| status.map_or(true, |s| c.status == s))
            .collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));

        let contacts = self.contacts();
        Ok(conversations
            .into_iter()
            .take(limit)
            .filter_map(|conversation| {
                let contact = contacts.iter().find(|c| c.id == conversation.contact_id)?.clone();
                Some(ConversationDetail { conversation, contact })
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl MessageRepository for MemoryStore {
    async fn create(&self, message: &NewMessage) -> Result<MessageEntity, error::SystemError> {
        if self.faults.fail_message_insert.load(Ordering::SeqCst) {
            return Err(db_down());
        }
        let now = Utc::now();
        let entity = MessageEntity {
            id: Uuid::now_v7(),
            contact_id: message.contact_id,
            conversation_id: message.conversation_id,
            direction: message.direction,
            _type: message._type,
            text: message.text.clone(),
            media_url: message.media_url.clone(),
            api_file_url: message.api_file_url.clone(),
            status: message.status,
            raw_payload: message.raw_payload.clone(),
            created_at: now,
            updated_at: now,
        };
        self.messages.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<MessageEntity>, error::SystemError> {
        Ok(self.messages.lock().unwrap().iter().find(|m| m.id == *id).cloned())
    }

    async fn find_by_query(
        &self,
        query: &MessageQuery,
        limit: usize,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        let mut messages: Vec<_> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.conversation_id == query.conversation_id)
            .filter(|m| query.created_at.map_or(true, |cursor| m.created_at < cursor))
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        messages.truncate(limit);
        Ok(messages)
    }

    async fn update_status(
        &self,
        id: &Uuid,
        status: MessageStatus,
    ) -> Result<Option<MessageEntity>, error::SystemError> {
        let mut messages = self.messages.lock().unwrap();
        let Some(m) = messages.iter_mut().find(|m| m.id == *id) else {
            return Ok(None);
        };
        m.status = status;
        m.updated_at = Utc::now();
        Ok(Some(m.clone()))
    }

    async fn create_event(
        &self,
        event: &NewMessageEvent,
    ) -> Result<MessageEventEntity, error::SystemError> {
        if self.faults.fail_events.load(Ordering::SeqCst) {
            return Err(db_down());
        }
        let entity = MessageEventEntity {
            id: Uuid::now_v7(),
            message_id: event.message_id,
            status: event.status,
            timestamp: Utc::now(),
            raw_payload: event.raw_payload.clone(),
        };
        self.events.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn find_events(
        &self,
        message_id: &Uuid,
    ) -> Result<Vec<MessageEventEntity>, error::SystemError> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.message_id == *message_id)
            .cloned()
            .collect())
    }
}
