use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::db::Store;

/// Health check endpoint
///
/// Reports whether the store answers. Public; not behind `Authenticate`.
#[get("/health")]
pub async fn health(store: web::Data<Store>) -> impl Responder {
    match store.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "store": "up",
            "timestamp": Utc::now()
        })),
        Err(_) => HttpResponse::ServiceUnavailable().json(json!({
            "status": "degraded",
            "store": "down",
            "timestamp": Utc::now()
        })),
    }
}
