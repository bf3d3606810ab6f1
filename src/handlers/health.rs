//! Health check endpoint for the detection relay.
//!
//! Provides a simple endpoint to verify service liveness for monitoring and orchestration.

use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;

use crate::AppState;

/// Returns a JSON response indicating the API is healthy and which backend
/// analysis requests are relayed to.
///
/// # Example
/// ```json
/// {
///   "status": "ok",
///   "backend": "huggingface",
///   "started_at": "2025-01-01T00:00:00Z",
///   "uptime_seconds": 42
/// }
/// ```
#[tracing::instrument(skip(app_state))]
pub async fn health_check(app_state: web::Data<AppState>) -> impl Responder {
    tracing::info!("Health check endpoint called");
    let uptime = Utc::now() - app_state.started_at;
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "backend": app_state.settings.backend,
        "started_at": app_state.started_at,
        "uptime_seconds": uptime.num_seconds().max(0),
    }))
}
