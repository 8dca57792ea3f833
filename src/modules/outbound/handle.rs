use actix_multipart::Multipart;
use actix_web::{post, web};
use futures_util::TryStreamExt;
use uuid::Uuid;

use crate::{
    api::{error, success},
    modules::{
        message::schema::MessageType,
        outbound::{
            model::{OutboundReceipt, SendMediaRequest, SendTextRequest},
            service::OutboundService,
        },
    },
    utils::ValidatedJson,
};

#[post("/send-text")]
pub async fn send_text(
    outbound_svc: web::Data<OutboundService>,
    body: ValidatedJson<SendTextRequest>,
) -> Result<success::Success<OutboundReceipt>, error::Error> {
    let body = body.0;
    let receipt = outbound_svc.send_text(body.conversation_id, body.text).await?;
    Ok(success::Success::ok(Some(receipt)).message("Message sent"))
}

/// Multipart fields: `conversation_id`, `type`, optional `text`, and `file`.
#[post("/send-media")]
pub async fn send_media(
    outbound_svc: web::Data<OutboundService>,
    mut payload: Multipart,
) -> Result<success::Success<OutboundReceipt>, error::Error> {
    let max_bytes = outbound_svc.max_media_bytes();

    let mut conversation_id = None;
    let mut media_type = None;
    let mut text = None;
    let mut file = None;

    while let Some(mut field) =
        payload.try_next().await.map_err(|e| error::Error::bad_request(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let content_type = field
            .content_type()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) =
            field.try_next().await.map_err(|e| error::Error::bad_request(e.to_string()))?
        {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(error::Error::bad_request(format!(
                    "File size exceeds maximum allowed size of {max_bytes} bytes"
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "conversation_id" | "conversationId" => {
                let value = field_text(bytes)?;
                conversation_id = Some(
                    Uuid::parse_str(value.trim())
                        .map_err(|_| error::Error::bad_request("Invalid conversation_id"))?,
                );
            }
            "type" => media_type = Some(field_text(bytes)?.parse::<MessageType>()?),
            "text" => text = Some(field_text(bytes)?),
            "file" => {
                let filename = filename.ok_or_else(|| error::Error::bad_request("Missing filename"))?;
                file = Some((filename, content_type, bytes));
            }
            _ => {}
        }
    }

    let (Some(conversation_id), Some(_type), Some((filename, content_type, bytes))) =
        (conversation_id, media_type, file)
    else {
        return Err(error::Error::bad_request(
            "Missing required fields: conversation_id, type, file",
        ));
    };

    let receipt = outbound_svc
        .send_media(SendMediaRequest { conversation_id, _type, text, filename, content_type, bytes })
        .await?;

    Ok(success::Success::ok(Some(receipt)).message("Media sent"))
}

fn field_text(bytes: Vec<u8>) -> Result<String, error::Error> {
    String::from_utf8(bytes).map_err(|_| error::Error::bad_request("Form field is not valid UTF-8"))
}
