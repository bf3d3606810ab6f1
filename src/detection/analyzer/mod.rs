//! AI-image detection client.
//!
//! Provides the [`Detector`] abstraction over the external inference providers,
//! the error type shared by all of them, and [`analyze`], which relays one image
//! to whichever backend the application is configured for.

mod huggingface;
mod lovable;

use std::future::Future;

use reqwest::{Response, StatusCode};
use thiserror::Error;
use tracing::{info, warn};

pub use huggingface::HuggingFaceDetector;
pub use lovable::LovableDetector;

use crate::{
    AppState,
    detection::AnalysisResult,
    models::Backend,
    services::{ImageError, ImageSource},
};

/// Errors that can occur when communicating with an upstream model.
#[derive(Debug, Error)]
pub enum DetectionError {
    /// The secret for the configured backend is not set.
    #[error("{0}")]
    MissingToken(&'static str),
    /// The provider rejected the call with 429.
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,
    /// The provider rejected the call with 402.
    #[error("Payment required. Please add credits to continue.")]
    PaymentRequired,
    /// Any other non-success status from the provider.
    #[error("{provider} API error ({status}): {body}")]
    Upstream {
        provider: &'static str,
        status: u16,
        body: String,
    },
    /// The provider answered 2xx with a body we could not read.
    #[error("Failed to parse {provider} response: {reason}")]
    Parse {
        provider: &'static str,
        reason: String,
    },
    /// The image itself could not be resolved for this backend.
    #[error(transparent)]
    Image(#[from] ImageError),
    /// Transport failure (connect, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// An upstream inference provider able to classify one image.
pub trait Detector: Send + Sync {
    /// Provider name used in logs and error messages.
    const PROVIDER: &'static str;

    fn detect<'a>(
        &'a self,
        image: &'a ImageSource,
    ) -> impl Future<Output = Result<AnalysisResult, DetectionError>> + 'a;
}

/// Relays `image` to the configured backend and returns the reshaped verdict.
#[tracing::instrument(skip(state, image), fields(backend = %state.settings.backend, image = %image.describe()))]
pub async fn analyze(state: &AppState, image: &ImageSource) -> Result<AnalysisResult, DetectionError> {
    let result = match state.settings.backend {
        Backend::HuggingFace => {
            HuggingFaceDetector::from_state(state)?
                .detect(image)
                .await?
        }
        Backend::Lovable => LovableDetector::from_state(state)?.detect(image).await?,
    };

    info!(
        verdict = result.verdict.as_str(),
        confidence = result.confidence,
        "analysis complete"
    );
    Ok(result)
}

/// Reads the body of a successful upstream response or converts the failure
/// status into a [`DetectionError`]. 429 and 402 keep their meaning; anything
/// else becomes [`DetectionError::Upstream`] carrying the body text.
async fn read_success_body(provider: &'static str, res: Response) -> Result<String, DetectionError> {
    let status = res.status();
    let body = res.text().await?;

    if status.is_success() {
        return Ok(body);
    }

    warn!(provider, status = status.as_u16(), body = %body, "upstream returned an error");
    Err(match status {
        StatusCode::TOO_MANY_REQUESTS => DetectionError::RateLimited,
        StatusCode::PAYMENT_REQUIRED => DetectionError::PaymentRequired,
        _ => DetectionError::Upstream {
            provider,
            status: status.as_u16(),
            body,
        },
    })
}
