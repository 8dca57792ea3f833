use actix_web::web::{self, scope, ServiceConfig};

use crate::modules::webhook::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/webhook")
            .service(
                web::resource("/messages")
                    .route(web::get().to(health))
                    .route(web::post().to(receive_message))
                    .route(web::put().to(receive_status)),
            )
            .service(web::resource("/messages/status").route(web::post().to(receive_status))),
    );
}
