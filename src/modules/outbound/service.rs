use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::contact::service::ContactService;
use crate::modules::conversation::service::ConversationService;
use crate::modules::gateway::client::WhatsAppGateway;
use crate::modules::gateway::model::{SendMedia, SendText};
use crate::modules::media::model::MediaFolder;
use crate::modules::media::service::BlobRelay;
use crate::modules::message::model::NewMessage;
use crate::modules::message::schema::{MessageDirection, MessageStatus, MessageType};
use crate::modules::message::service::MessageService;
use crate::modules::outbound::model::{OutboundReceipt, SendMediaRequest};

/// Sends through the gateway and mirrors every attempt as an outbound message.
/// A rejected send is kept with status `error` so it stays visible in the chat.
#[derive(Clone)]
pub struct OutboundService {
    gateway: Arc<dyn WhatsAppGateway + Send + Sync>,
    contact_svc: ContactService,
    conversation_svc: ConversationService,
    message_svc: MessageService,
    relay: BlobRelay,
}

struct Draft {
    contact_id: Uuid,
    conversation_id: Uuid,
    _type: MessageType,
    text: Option<String>,
    media_url: Option<String>,
}

impl OutboundService {
    pub fn with_dependencies(
        gateway: Arc<dyn WhatsAppGateway + Send + Sync>,
        contact_svc: ContactService,
        conversation_svc: ConversationService,
        message_svc: MessageService,
        relay: BlobRelay,
    ) -> Self {
        OutboundService { gateway, contact_svc, conversation_svc, message_svc, relay }
    }

    pub fn max_media_bytes(&self) -> usize {
        self.relay.max_bytes()
    }

    pub async fn send_text(
        &self,
        conversation_id: Uuid,
        text: String,
    ) -> Result<OutboundReceipt, error::SystemError> {
        let conversation = self.conversation_svc.get_by_id(conversation_id).await?;
        let contact = self.contact_svc.get_by_id(conversation.contact_id).await?;

        let sent = self
            .gateway
            .send_text(&SendText { number: contact.number.clone(), text: text.clone() })
            .await;

        let draft = Draft {
            contact_id: contact.id,
            conversation_id,
            _type: MessageType::Text,
            text: Some(text),
            media_url: None,
        };
        self.mirror(draft, sent).await
    }

    pub async fn send_media(
        &self,
        request: SendMediaRequest,
    ) -> Result<OutboundReceipt, error::SystemError> {
        if request._type == MessageType::Text {
            return Err(error::SystemError::bad_request("Media type must not be text"));
        }

        let conversation = self.conversation_svc.get_by_id(request.conversation_id).await?;
        let contact = self.contact_svc.get_by_id(conversation.contact_id).await?;

        let media_url = self
            .relay
            .upload_from_buffer(
                request.bytes,
                &request.filename,
                &request.content_type,
                MediaFolder::from(request._type),
            )
            .await?;

        let text = request.text.filter(|t| !t.trim().is_empty());
        let sent = self
            .gateway
            .send_media(&SendMedia {
                number: contact.number.clone(),
                _type: request._type,
                file: media_url.clone(),
                text: text.clone().unwrap_or_default(),
            })
            .await;

        let draft = Draft {
            contact_id: contact.id,
            conversation_id: conversation.id,
            _type: request._type,
            text,
            media_url: Some(media_url),
        };
        self.mirror(draft, sent).await
    }

    async fn mirror(
        &self,
        draft: Draft,
        sent: Result<serde_json::Value, error::SystemError>,
    ) -> Result<OutboundReceipt, error::SystemError> {
        let (status, raw_payload) = match &sent {
            Ok(response) => (MessageStatus::Sent, response.clone()),
            Err(e) => (MessageStatus::Error, serde_json::json!({ "error": e.to_string() })),
        };

        let recorded = self
            .message_svc
            .record(NewMessage {
                contact_id: draft.contact_id,
                conversation_id: draft.conversation_id,
                direction: MessageDirection::Outbound,
                _type: draft._type,
                text: draft.text,
                media_url: draft.media_url.clone(),
                api_file_url: draft.media_url.clone(),
                status,
                raw_payload: Some(raw_payload),
            })
            .await;

        match (sent, recorded) {
            (Ok(api_response), Ok(message)) => Ok(OutboundReceipt {
                message_id: message.id,
                conversation_id: message.conversation_id,
                media_url: draft.media_url,
                api_response,
            }),
            (Ok(_), Err(e)) => {
                tracing::error!(
                    conversation_id = %draft.conversation_id,
                    error = %e,
                    "message sent but could not be recorded"
                );
                Err(e)
            }
            (Err(e), recorded) => {
                if let Err(record_err) = recorded {
                    tracing::warn!(error = %record_err, "failed to record rejected send");
                }
                tracing::warn!(conversation_id = %draft.conversation_id, error = %e, "outbound send failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::modules::media::repository_fs::LocalBlobStore;
    use crate::test::MemoryStore;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct FakeGateway {
        pub(crate) reject: AtomicBool,
        pub(crate) sent: Mutex<Vec<serde_json::Value>>,
    }

    #[async_trait::async_trait]
    impl WhatsAppGateway for FakeGateway {
        async fn send_text(
            &self,
            params: &SendText,
        ) -> Result<serde_json::Value, error::SystemError> {
            if self.reject.load(Ordering::SeqCst) {
                return Err(error::SystemError::gateway("UAZAPI error 500: down"));
            }
            self.sent.lock().unwrap().push(serde_json::to_value(params).unwrap());
            Ok(serde_json::json!({"messageid": "WA1"}))
        }

        async fn send_media(
            &self,
            params: &SendMedia,
        ) -> Result<serde_json::Value, error::SystemError> {
            if self.reject.load(Ordering::SeqCst) {
                return Err(error::SystemError::gateway("UAZAPI error 500: down"));
            }
            self.sent.lock().unwrap().push(serde_json::to_value(params).unwrap());
            Ok(serde_json::json!({"messageid": "WA2"}))
        }
    }

    pub(crate) fn outbound(
        store: &Arc<MemoryStore>,
        gateway: &Arc<FakeGateway>,
        media_dir: &std::path::Path,
    ) -> OutboundService {
        let relay = BlobRelay::new(
            Arc::new(LocalBlobStore::new(media_dir, "http://localhost:8080")),
            1024,
        )
        .unwrap();
        OutboundService::with_dependencies(
            gateway.clone(),
            ContactService::with_dependencies(store.clone()),
            ConversationService::with_dependencies(store.clone(), store.clone()),
            MessageService::with_dependencies(store.clone(), store.clone(), store.clone()),
            relay,
        )
    }

    #[tokio::test]
    async fn test_send_text_records_sent_message() {
        let store = Arc::new(MemoryStore::default());
        let gateway = Arc::new(FakeGateway::default());
        let dir = tempfile::tempdir().unwrap();
        let contact = store.insert_contact("5511999", None);
        let conversation = store.insert_conversation(contact.id);

        let receipt = outbound(&store, &gateway, dir.path())
            .send_text(conversation.id, "olá".into())
            .await
            .unwrap();

        assert_eq!(
            gateway.sent.lock().unwrap()[0],
            serde_json::json!({"number": "5511999", "text": "olá"})
        );
        let message = &store.messages()[0];
        assert_eq!(message.id, receipt.message_id);
        assert_eq!(message.direction, MessageDirection::Outbound);
        assert_eq!(message.status, MessageStatus::Sent);
        assert_eq!(message.raw_payload, Some(serde_json::json!({"messageid": "WA1"})));
    }

    #[tokio::test]
    async fn test_rejected_send_is_recorded_as_error() {
        let store = Arc::new(MemoryStore::default());
        let gateway = Arc::new(FakeGateway::default());
        gateway.reject.store(true, Ordering::SeqCst);
        let dir = tempfile::tempdir().unwrap();
        let contact = store.insert_contact("5511999", None);
        let conversation = store.insert_conversation(contact.id);

        let result =
            outbound(&store, &gateway, dir.path()).send_text(conversation.id, "olá".into()).await;

        assert!(matches!(result, Err(error::SystemError::Gateway(_))));
        let messages = store.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].status, MessageStatus::Error);
        assert_eq!(messages[0].text.as_deref(), Some("olá"));
    }

    #[tokio::test]
    async fn test_send_to_unknown_conversation() {
        let store = Arc::new(MemoryStore::default());
        let gateway = Arc::new(FakeGateway::default());
        let dir = tempfile::tempdir().unwrap();

        let result =
            outbound(&store, &gateway, dir.path()).send_text(Uuid::now_v7(), "olá".into()).await;

        assert!(matches!(result, Err(error::SystemError::NotFound(_))));
        assert!(gateway.sent.lock().unwrap().is_empty());
        assert!(store.messages().is_empty());
    }

    #[tokio::test]
    async fn test_send_media_uploads_then_sends_public_url() {
        let store = Arc::new(MemoryStore::default());
        let gateway = Arc::new(FakeGateway::default());
        let dir = tempfile::tempdir().unwrap();
        let contact = store.insert_contact("5511999", None);
        let conversation = store.insert_conversation(contact.id);

        let receipt = outbound(&store, &gateway, dir.path())
            .send_media(SendMediaRequest {
                conversation_id: conversation.id,
                _type: MessageType::Image,
                text: Some("foto".into()),
                filename: "photo.png".into(),
                content_type: "image/png".into(),
                bytes: b"png".to_vec(),
            })
            .await
            .unwrap();

        let media_url = receipt.media_url.unwrap();
        assert!(media_url.starts_with("http://localhost:8080/uploads/images/"));
        let sent = &gateway.sent.lock().unwrap()[0];
        assert_eq!(sent["type"], "image");
        assert_eq!(sent["file"], media_url.as_str());
        assert_eq!(sent["text"], "foto");

        let message = &store.messages()[0];
        assert_eq!(message._type, MessageType::Image);
        assert_eq!(message.media_url.as_deref(), Some(media_url.as_str()));
        assert_eq!(message.api_file_url.as_deref(), Some(media_url.as_str()));
    }

    #[tokio::test]
    async fn test_send_media_rejects_text_type() {
        let store = Arc::new(MemoryStore::default());
        let gateway = Arc::new(FakeGateway::default());
        let dir = tempfile::tempdir().unwrap();

        let result = outbound(&store, &gateway, dir.path())
            .send_media(SendMediaRequest {
                conversation_id: Uuid::now_v7(),
                _type: MessageType::Text,
                text: None,
                filename: "a.txt".into(),
                content_type: "text/plain".into(),
                bytes: b"a".to_vec(),
            })
            .await;

        assert!(matches!(result, Err(error::SystemError::BadRequest(_))));
    }
}
