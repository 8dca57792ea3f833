use actix_web::{web, HttpResponse};

use crate::{
    api::error,
    modules::webhook::{
        model::{HealthResponse, WebhookAck},
        service::{IngestOutcome, IngestionService},
    },
};

pub async fn receive_message(
    ingestion_svc: web::Data<IngestionService>,
    body: web::Json<serde_json::Value>,
) -> Result<HttpResponse, error::Error> {
    let ack = match ingestion_svc.ingest(body.into_inner()).await? {
        IngestOutcome::Persisted { message_id, conversation_id } => {
            WebhookAck::persisted(message_id, conversation_id)
        }
        IngestOutcome::Ignored => WebhookAck::ignored(),
    };

    Ok(HttpResponse::Ok().json(ack))
}

pub async fn receive_status(
    ingestion_svc: web::Data<IngestionService>,
    body: web::Json<serde_json::Value>,
) -> Result<HttpResponse, error::Error> {
    ingestion_svc.ingest_status(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(WebhookAck::ok()))
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse { status: "ok", timestamp: chrono::Utc::now() })
}
