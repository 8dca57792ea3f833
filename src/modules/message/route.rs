use actix_web::web::{scope, ServiceConfig};

use crate::modules::message::handle::*;

/// Outbound sends share the `/messages` scope, so they are mounted here.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/messages")
            .configure(crate::modules::outbound::route::configure)
            .service(get_message_events),
    );
}
