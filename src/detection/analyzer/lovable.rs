use std::future::Future;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{DetectionError, Detector, read_success_body};
use crate::{
    AppState,
    detection::AnalysisResult,
    services::ImageSource,
};

const SYSTEM_PROMPT: &str = "You are an expert forensic analyst who detects AI-generated images. \
Inspect the image for diffusion artifacts, inconsistent lighting and shadows, malformed hands or text, \
unnatural textures, and missing camera noise. Respond ONLY with a JSON object of the form \
{\"confidence\": <number 0-100>, \"verdict\": \"AI_GENERATED\" | \"LIKELY_AI\" | \"UNCERTAIN\" | \"LIKELY_REAL\" | \"REAL\", \
\"signals\": [{\"name\": string, \"detected\": boolean, \"severity\": \"low\" | \"medium\" | \"high\", \"description\": string}], \
\"summary\": string}. Do not wrap the JSON in prose.";

const USER_PROMPT: &str = "Analyze this image and report whether it is AI-generated.";

/// Lovable AI gateway (OpenAI-compatible chat completions with vision input).
pub struct LovableDetector {
    client: Client,
    api_key: String,
    gateway_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

impl LovableDetector {
    pub fn new(
        client: Client,
        api_key: impl Into<String>,
        gateway_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            gateway_url: gateway_url.into(),
            model: model.into(),
        }
    }

    pub fn from_state(state: &AppState) -> Result<Self, DetectionError> {
        let api_key = state
            .settings
            .lovable_api_key
            .clone()
            .ok_or(DetectionError::MissingToken("LOVABLE_API_KEY is not configured"))?;

        Ok(Self::new(
            state.http.clone(),
            api_key,
            state.settings.lovable_gateway_url.clone(),
            state.settings.lovable_model.clone(),
        ))
    }

    fn request_body(&self, image: &ImageSource) -> serde_json::Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": USER_PROMPT },
                        { "type": "image_url", "image_url": { "url": image.as_url() } }
                    ]
                }
            ]
        })
    }
}

impl Detector for LovableDetector {
    const PROVIDER: &'static str = "AI gateway";

    fn detect<'a>(
        &'a self,
        image: &'a ImageSource,
    ) -> impl Future<Output = Result<AnalysisResult, DetectionError>> + 'a {
        async move {
            let res = self
                .client
                .post(&self.gateway_url)
                .bearer_auth(&self.api_key)
                .json(&self.request_body(image))
                .send()
                .await?;

            let body = read_success_body(Self::PROVIDER, res).await?;
            let result = result_from_completion(&body)?;
            debug!(verdict = result.verdict.as_str(), "gateway verdict parsed");

            Ok(result)
        }
    }
}

fn parse_error(reason: impl Into<String>) -> DetectionError {
    DetectionError::Parse {
        provider: LovableDetector::PROVIDER,
        reason: reason.into(),
    }
}

/// Pulls the assistant message out of a chat-completions body and parses the
/// analysis JSON it contains.
fn result_from_completion(body: &str) -> Result<AnalysisResult, DetectionError> {
    let completion: ChatCompletion =
        serde_json::from_str(body).map_err(|e| parse_error(e.to_string()))?;

    let content = completion
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| parse_error("no message content in completion"))?;

    let json = extract_json_object(&content)
        .ok_or_else(|| parse_error("no JSON object in model reply"))?;

    serde_json::from_str::<AnalysisResult>(json)
        .map(AnalysisResult::normalized)
        .map_err(|e| parse_error(e.to_string()))
}

/// Returns the outermost `{...}` slice of `text`, skipping any code fences or
/// prose the model wrapped around it.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
