use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::extractors::Authorized;
use crate::AppError;

#[derive(Debug, Serialize)]
struct WhoAmI {
    user_id: String,
    email: String,
    expires_at: i64,
}

async fn me(who: Authorized) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(WhoAmI {
        user_id: who.user_id,
        email: who.payload.sub,
        expires_at: who.payload.exp,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/me", web::get().to(me));
}
