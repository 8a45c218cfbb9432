use axum::Json;
use axum::http::header;
use axum::response::IntoResponse;

use crate::error::AppError;
use crate::models::health::HealthResponse;

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    operation_id = "healthCheck",
    summary = "Service health check",
    description = "Unauthenticated. Responses are never cached.",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
)]
pub async fn health_check() -> impl IntoResponse {
    let hostname = std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".into());
    (
        [(header::CACHE_CONTROL, "no-cache")],
        Json(HealthResponse {
            status: "ok",
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            hostname,
        }),
    )
}

/// Fallback for unmatched routes.
pub async fn not_found() -> AppError {
    AppError::NotFound("not found".into())
}
