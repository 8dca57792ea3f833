use actix_web::{get, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    modules::message::{schema::MessageEventEntity, service::MessageService},
};

#[get("/{message_id}/events")]
pub async fn get_message_events(
    message_svc: web::Data<MessageService>,
    message_id: web::Path<Uuid>,
) -> Result<success::Success<Vec<MessageEventEntity>>, error::Error> {
    let events = message_svc.events(*message_id).await?;
    Ok(success::Success::ok(Some(events)).message("Successfully retrieved message events"))
}
