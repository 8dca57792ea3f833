use actix_web::{get, post, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    modules::{
        conversation::{
            model::{ConversationListResponse, ConversationQueryRequest, MessageQueryRequest},
            schema::ConversationEntity,
            service::ConversationService,
        },
        message::model::GetMessageResponse,
    },
    utils::ValidatedQuery,
};

#[get("")]
pub async fn list_conversations(
    conversation_svc: web::Data<ConversationService>,
    query: ValidatedQuery<ConversationQueryRequest>,
) -> Result<success::Success<ConversationListResponse>, error::Error> {
    let query = query.0;
    let conversations = conversation_svc.list(query.status, query.limit).await?;
    Ok(success::Success::ok(Some(ConversationListResponse { conversations }))
        .message("Successfully retrieved conversations"))
}

#[get("/{conversation_id}/messages")]
pub async fn get_messages(
    conversation_svc: web::Data<ConversationService>,
    conversation_id: web::Path<Uuid>,
    query: ValidatedQuery<MessageQueryRequest>,
) -> Result<success::Success<GetMessageResponse>, error::Error> {
    let query = query.0;
    let (messages, cursor) =
        conversation_svc.get_messages(*conversation_id, query.limit, query.cursor).await?;
    Ok(success::Success::ok(Some(GetMessageResponse { messages, cursor }))
        .message("Successfully retrieved messages"))
}

#[post("/{conversation_id}/close")]
pub async fn close_conversation(
    conversation_svc: web::Data<ConversationService>,
    conversation_id: web::Path<Uuid>,
) -> Result<success::Success<ConversationEntity>, error::Error> {
    let conversation = conversation_svc.close(*conversation_id).await?;
    Ok(success::Success::ok(Some(conversation)).message("Conversation closed"))
}
