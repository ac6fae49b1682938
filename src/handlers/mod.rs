pub mod admin;
pub mod auth;

use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::info;

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// Bodies that are not a JSON object of scalars never reach validation.
fn json_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    info!(path = %req.path(), error = %err, "Rejected request body");
    let response = HttpResponse::BadRequest().json(json!({
        "error": err.to_string()
    }));
    InternalError::from_response(err, response).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .route("/health", web::get().to(health_check))
        .route("/api/auth/signup", web::post().to(auth::signup))
        .route("/admin/users/{id}/update", web::get().to(admin::edit))
        .route("/admin/users/{id}/update", web::post().to(admin::update))
        .route("/admin/users/{id}/confirm", web::post().to(admin::confirm))
        .route("/admin/users/{id}/block", web::post().to(admin::block));
}
