//! Request/response bodies and the API error type for the analysis endpoint.
//!
//! # Wire format
//!
//! ```json
//! { "imageUrl": "https://example.com/photo.jpg" }
//! { "imageBase64": "data:image/png;base64,iVBORw0KGgo..." }
//! ```
//!
//! Success bodies are [`AnalysisResult`](crate::detection::AnalysisResult);
//! every failure is `{ "error": "<message>" }` with a 4xx/5xx status.

use actix_web::{
    HttpRequest, HttpResponse, ResponseError,
    error::JsonPayloadError,
    http::StatusCode,
    web,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::{
    detection::DetectionError,
    services::{ImageError, ImageSource},
};

/// Body of `POST /api/analyze-image`.
///
/// Both fields are optional on the wire; at least one must be non-empty.
/// When both are present the inline payload wins.
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Public URL of the image
    #[validate(url)]
    pub image_url: Option<String>,
    /// Base64 payload, bare or as a `data:` URL
    pub image_base64: Option<String>,
}

impl AnalyzeRequest {
    /// Treats empty and whitespace-only strings as absent.
    pub fn normalized(self) -> Self {
        fn keep(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            image_url: keep(self.image_url),
            image_base64: keep(self.image_base64),
        }
    }

    /// Validates the request and resolves it into an [`ImageSource`].
    ///
    /// # Errors
    ///
    /// * [`AnalyzeError::MissingImage`] when neither field carries a value
    /// * [`AnalyzeError::InvalidUrl`] when `imageUrl` is not a URL
    /// * [`AnalyzeError::Image`] when `imageBase64` does not decode
    pub fn into_source(self) -> Result<ImageSource, AnalyzeError> {
        let request = self.normalized();

        if let Some(payload) = request.image_base64.as_deref() {
            return Ok(ImageSource::from_base64(payload)?);
        }

        request
            .validate()
            .map_err(|_| AnalyzeError::InvalidUrl)?;

        match request.image_url {
            Some(url) => Ok(ImageSource::from_url(url)),
            None => Err(AnalyzeError::MissingImage),
        }
    }
}

/// Failure body returned by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Everything that can go wrong while serving an analysis request.
///
/// Each variant maps to one HTTP status; the display string is the `error`
/// field of the response body.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// Neither `imageUrl` nor `imageBase64` was provided.
    #[error("Please provide imageBase64 or imageUrl")]
    MissingImage,

    /// `imageUrl` is present but not a URL.
    #[error("imageUrl must be a valid URL")]
    InvalidUrl,

    /// The request body is not valid JSON or has the wrong shape.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// The request body exceeds the configured limit.
    #[error("Request body exceeds {0} bytes")]
    BodyTooLarge(usize),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Detection(#[from] DetectionError),
}

impl ResponseError for AnalyzeError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingImage | Self::InvalidUrl | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Image(ImageError::InvalidBase64(_) | ImageError::Empty) => StatusCode::BAD_REQUEST,
            Self::Image(ImageError::TooLarge(_))
            | Self::Detection(DetectionError::Image(ImageError::TooLarge(_))) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            Self::Image(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Detection(DetectionError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
            Self::Detection(DetectionError::PaymentRequired) => StatusCode::PAYMENT_REQUIRED,
            Self::Detection(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

/// JSON extractor configuration for the analysis endpoint: raises the body
/// limit to fit inline images and turns extractor failures into
/// [`AnalyzeError`] bodies instead of actix's plain-text defaults.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(move |err: JsonPayloadError, _req: &HttpRequest| {
            let api_err = match err {
                JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                    AnalyzeError::BodyTooLarge(limit)
                }
                other => AnalyzeError::InvalidBody(other.to_string()),
            };
            tracing::warn!(error = %api_err, "rejected analysis request body");
            api_err.into()
        })
}
