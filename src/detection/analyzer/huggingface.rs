use std::future::Future;

use reqwest::{Client, header};
use serde::Deserialize;
use tracing::debug;

use super::{DetectionError, Detector, read_success_body};
use crate::{
    AppState,
    detection::AnalysisResult,
    models::HfPayload,
    services::ImageSource,
};

/// Score used when the model answers with something other than a label list.
const NEUTRAL_SCORE: f64 = 0.5;

/// Label fragments that mark an AI-generated class.
const AI_LABEL_HINTS: [&str; 3] = ["ai", "generated", "fake"];

/// Hugging Face hosted image-classification model.
pub struct HuggingFaceDetector {
    client: Client,
    token: String,
    model_url: String,
    payload: HfPayload,
    max_image_bytes: usize,
}

/// One entry of an image-classification response.
#[derive(Debug, Deserialize)]
struct Classification {
    label: String,
    score: f64,
}

impl HuggingFaceDetector {
    pub fn new(client: Client, token: impl Into<String>, model_url: impl Into<String>, payload: HfPayload) -> Self {
        Self {
            client,
            token: token.into(),
            model_url: model_url.into(),
            payload,
            max_image_bytes: crate::models::DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Caps the size of remote images downloaded for binary payloads.
    pub fn with_max_image_bytes(mut self, limit: usize) -> Self {
        self.max_image_bytes = limit;
        self
    }

    pub fn from_state(state: &AppState) -> Result<Self, DetectionError> {
        let token = state
            .settings
            .huggingface_token
            .clone()
            .ok_or(DetectionError::MissingToken("Hugging Face token not set"))?;

        Ok(Self::new(
            state.http.clone(),
            token,
            state.settings.huggingface_model_url.clone(),
            state.settings.huggingface_payload,
        )
        .with_max_image_bytes(state.settings.max_body_bytes))
    }
}

impl Detector for HuggingFaceDetector {
    const PROVIDER: &'static str = "Hugging Face";

    fn detect<'a>(
        &'a self,
        image: &'a ImageSource,
    ) -> impl Future<Output = Result<AnalysisResult, DetectionError>> + 'a {
        async move {
            let request = self.client.post(&self.model_url).bearer_auth(&self.token);
            let request = match self.payload {
                HfPayload::Binary => request
                    .header(header::CONTENT_TYPE, "application/octet-stream")
                    .body(image.bytes(&self.client, self.max_image_bytes).await?),
                HfPayload::Json => request.json(&serde_json::json!({ "inputs": image.as_inputs() })),
            };

            let res = request.send().await?;
            let body = read_success_body(Self::PROVIDER, res).await?;
            let score = ai_score_from_body(&body)?;
            debug!(score, "hugging face score extracted");

            Ok(AnalysisResult::from_ai_score(score))
        }
    }
}

/// Extracts the AI-likelihood score from a raw response body.
///
/// A list of `{label, score}` entries yields the score of the first label that
/// looks like an AI/fake class, else the first entry's score. Any other valid
/// JSON shape (an object, an empty list) is treated as no information and
/// yields the neutral score. Invalid JSON is an error.
fn ai_score_from_body(body: &str) -> Result<f64, DetectionError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| DetectionError::Parse {
            provider: HuggingFaceDetector::PROVIDER,
            reason: e.to_string(),
        })?;

    let Some(entries) = value.as_array().filter(|a| !a.is_empty()) else {
        return Ok(NEUTRAL_SCORE);
    };

    // Some models nest the list one level deeper for single inputs.
    let entries = match entries.first().and_then(|e| e.as_array()) {
        Some(inner) => inner,
        None => entries,
    };

    let classifications: Vec<Classification> = entries
        .iter()
        .filter_map(|e| serde_json::from_value(e.clone()).ok())
        .collect();

    let picked = classifications
        .iter()
        .find(|c| {
            let label = c.label.to_lowercase();
            AI_LABEL_HINTS.iter().any(|hint| label.contains(hint))
        })
        .or_else(|| classifications.first());

    Ok(picked.map(|c| c.score).unwrap_or(NEUTRAL_SCORE))
}
