use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::errors::ErrorCode;

async fn health() -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().body("ok"))
}

/// Canned failure endpoint so the Problem Details contract stays covered by
/// integration tests.
async fn health_error() -> Result<HttpResponse, AppError> {
    Err(AppError::validation(
        ErrorCode::ValidationError,
        "Example failure",
    ))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/health/error", web::get().to(health_error));
}
