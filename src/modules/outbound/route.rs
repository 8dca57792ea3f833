use actix_web::web::ServiceConfig;

use crate::modules::outbound::handle::*;

/// Mounted inside the `/messages` scope.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(send_text).service(send_media);
}
