//! Image analysis endpoint.
//!
//! Receives an image reference, relays it to the configured detector backend
//! and returns the reshaped verdict.

use actix_web::{HttpResponse, web};
use tracing::{error, info};

use crate::{
    AppState,
    detection,
    handlers::data::{AnalyzeError, AnalyzeRequest},
};

/// Analyzes one image.
///
/// # HTTP Method
/// `POST /api/analyze-image`
///
/// # Request Body (JSON)
/// ```json
/// { "imageUrl": "https://example.com/photo.jpg" }
/// ```
/// or
/// ```json
/// { "imageBase64": "data:image/png;base64,iVBORw0KGgo..." }
/// ```
///
/// # Success Response (200 OK)
/// ```json
/// {
///   "confidence": 82.0,
///   "verdict": "AI_GENERATED",
///   "signals": [
///     { "name": "AI Pattern Detection", "detected": true, "severity": "high",
///       "description": "CLIP model detected 82.0% AI-generated characteristics" }
///   ],
///   "summary": "Based on multimodal AI analysis, this image is ai generated. Confidence: 82.0%"
/// }
/// ```
///
/// # Error Responses
/// - `400 Bad Request`: no image, malformed body, invalid URL or base64
/// - `402 Payment Required`: upstream credits exhausted
/// - `413 Payload Too Large`: body above `MAX_BODY_BYTES`
/// - `429 Too Many Requests`: upstream rate limit
/// - `500 Internal Server Error`: token missing, upstream failure, unreadable upstream reply
#[tracing::instrument(skip(app_state, payload), fields(backend = %app_state.settings.backend))]
pub async fn analyze_image(
    app_state: web::Data<AppState>,
    payload: web::Json<AnalyzeRequest>,
) -> Result<HttpResponse, AnalyzeError> {
    let source = payload.into_inner().into_source().inspect_err(|e| {
        info!(error = %e, "rejected analysis request");
    })?;

    match detection::analyze(&app_state, &source).await {
        Ok(result) => Ok(HttpResponse::Ok().json(result)),
        Err(e) => {
            error!(error = %e, image = %source.describe(), "image analysis failed");
            Err(e.into())
        }
    }
}

/// Answers CORS preflight requests with an empty 200; the CORS headers are
/// added by [`Cors`](crate::middleware::Cors).
pub async fn preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}
