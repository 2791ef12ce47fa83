use actix_web::{HttpResponse, Responder, web};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::store::EntryStore;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: &'static str,
    #[schema(example = "2024-06-05T09:00:00Z")]
    pub timestamp: String,
    #[schema(example = "mysql")]
    pub store: &'static str,
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health(store: web::Data<dyn EntryStore>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        store: store.backend(),
    })
}
