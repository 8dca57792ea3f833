use actix_web::web::{scope, ServiceConfig};

use crate::modules::media::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/uploads").service(serve_upload));
}
