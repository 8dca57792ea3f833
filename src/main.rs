use actix_cors::Cors;
use actix_web::{self, middleware::Logger, web, App, HttpServer};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::{connect_database, run_migrations},
    modules::{
        contact::{repository_pg::ContactRepositoryPg, service::ContactService},
        conversation::{repository_pg::ConversationPgRepository, service::ConversationService},
        gateway::client::UazapiClient,
        media::{
            repository::BlobStore, repository_fs::LocalBlobStore,
            repository_http::HttpBlobStore, service::BlobRelay,
        },
        message::{repository_pg::MessageRepositoryPg, service::MessageService},
        outbound::service::OutboundService,
        webhook::service::IngestionService,
    },
};

mod api;
mod configs;
mod constants;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    let env = constants::Env::default();
    log::info!("Environment variables loaded");
    env
});

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

#[actix_web::get("/")]
async fn health_check() -> web::Json<serde_json::Value> {
    web::Json(serde_json::json!({ "status": "ok", "timestamp": chrono::Utc::now() }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let db_pool = connect_database().await.map_err(|e| {
        tracing::error!(error = %e, "database connection failed");
        std::io::Error::other("Database connection error")
    })?;
    run_migrations(&db_pool).await.map_err(|e| {
        tracing::error!(error = %e, "migrations failed");
        std::io::Error::other("Database migration error")
    })?;

    let contact_repo = Arc::new(ContactRepositoryPg::new(db_pool.clone()));
    let conversation_repo = Arc::new(ConversationPgRepository::new(db_pool.clone()));
    let message_repo = Arc::new(MessageRepositoryPg::new(db_pool.clone()));

    let local_store = LocalBlobStore::new(&ENV.upload_dir, &ENV.public_base_url);
    let blob_store: Arc<dyn BlobStore + Send + Sync> =
        match (&ENV.storage_url, &ENV.storage_service_key) {
            (Some(url), Some(key)) => {
                tracing::info!(bucket = %ENV.storage_bucket, "using HTTP object storage for media");
                Arc::new(
                    HttpBlobStore::new(url, key, &ENV.storage_bucket)
                        .map_err(|e| std::io::Error::other(e.to_string()))?,
                )
            }
            _ => {
                tracing::info!(dir = %ENV.upload_dir, "using local disk for media");
                Arc::new(local_store.clone())
            }
        };
    let relay = BlobRelay::new(blob_store, ENV.media_max_bytes)
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let gateway = UazapiClient::new(&ENV.gateway_base_url, &ENV.gateway_token, ENV.gateway_timeout)
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let contact_service = ContactService::with_dependencies(contact_repo.clone());
    let conversation_service =
        ConversationService::with_dependencies(conversation_repo.clone(), message_repo.clone());
    let message_service =
        MessageService::with_dependencies(message_repo, contact_repo, conversation_repo);
    let ingestion_service = IngestionService::with_dependencies(
        contact_service.clone(),
        conversation_service.clone(),
        message_service.clone(),
        relay.clone(),
    )
    .with_timeouts(ENV.media_relay_timeout, ENV.webhook_deadline);
    let outbound_service = OutboundService::with_dependencies(
        Arc::new(gateway),
        contact_service,
        conversation_service.clone(),
        message_service.clone(),
        relay,
    );

    tracing::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&ENV.frontend_url)
            .allowed_methods(vec!["GET", "POST", "PUT"])
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(utils::json_config())
            .app_data(web::Data::new(ingestion_service.clone()))
            .app_data(web::Data::new(outbound_service.clone()))
            .app_data(web::Data::new(conversation_service.clone()))
            .app_data(web::Data::new(message_service.clone()))
            .app_data(web::Data::new(local_store.clone()))
            .service(health_check)
            .configure(modules::media::route::configure)
            .service(
                web::scope("/api")
                    .configure(modules::webhook::route::configure)
                    .configure(modules::message::route::configure)
                    .configure(modules::conversation::route::configure),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
