/// Health and metrics endpoints
use actix_web::{web, HttpResponse};

use crate::error::{AppError, Result};
use crate::services::DerivedAssetResolver;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"status": "ok"}))
}

pub async fn live() -> HttpResponse {
    HttpResponse::Ok().finish()
}

/// Ready once the object store answers
pub async fn ready(resolver: web::Data<DerivedAssetResolver>) -> Result<HttpResponse> {
    resolver
        .store()
        .health_check()
        .await
        .map_err(|e| AppError::Unavailable(e.to_string()))?;

    Ok(HttpResponse::Ok().finish())
}

pub async fn metrics(resolver: web::Data<DerivedAssetResolver>) -> Result<HttpResponse> {
    let body = resolver.metrics().render()?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(body))
}
