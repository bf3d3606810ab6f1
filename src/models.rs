//! Runtime configuration and shared application state.
//!
//! Everything is read from environment variables (optionally seeded from a
//! `.env` file by the binary). Upstream secrets are looked up by variable name
//! only and are allowed to be absent at start-up: a missing token is reported
//! per request by the backend that needs it.

use std::{env, fmt, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DEFAULT_HUGGINGFACE_MODEL_URL: &str =
    "https://api-inference.huggingface.co/models/Falconsai/nsfw_image_detection";
pub const DEFAULT_LOVABLE_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
pub const DEFAULT_LOVABLE_MODEL: &str = "google/gemini-2.5-flash";
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);

/// Upstream inference provider requests are relayed to.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Hugging Face hosted image-classification model.
    HuggingFace,
    /// Lovable AI gateway, OpenAI-compatible chat completions.
    Lovable,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "huggingface" | "hf" => Ok(Self::HuggingFace),
            "lovable" => Ok(Self::Lovable),
            other => anyhow::bail!("unknown detector backend `{other}` (expected huggingface or lovable)"),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::HuggingFace => "huggingface",
            Self::Lovable => "lovable",
        })
    }
}

/// Body shape sent to the Hugging Face inference endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HfPayload {
    /// Raw image bytes as the request body.
    Binary,
    /// `{"inputs": "<url or base64>"}`.
    Json,
}

impl FromStr for HfPayload {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "binary" | "bytes" => Ok(Self::Binary),
            "json" => Ok(Self::Json),
            other => anyhow::bail!("unknown Hugging Face payload `{other}` (expected binary or json)"),
        }
    }
}

/// Resolved configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Backend every analysis request goes to
    pub backend: Backend,
    /// Hugging Face access token (`HUGGINGFACE_TOKEN`)
    pub huggingface_token: Option<String>,
    pub huggingface_model_url: String,
    pub huggingface_payload: HfPayload,
    /// Lovable gateway key (`LOVABLE_API_KEY`)
    pub lovable_api_key: Option<String>,
    pub lovable_gateway_url: String,
    pub lovable_model: String,
    /// Timeout applied to every outbound request
    pub upstream_timeout: Duration,
    /// Largest accepted JSON request body
    pub max_body_bytes: usize,
    pub host: String,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: Backend::HuggingFace,
            huggingface_token: None,
            huggingface_model_url: DEFAULT_HUGGINGFACE_MODEL_URL.to_string(),
            huggingface_payload: HfPayload::Binary,
            lovable_api_key: None,
            lovable_gateway_url: DEFAULT_LOVABLE_GATEWAY_URL.to_string(),
            lovable_model: DEFAULT_LOVABLE_MODEL.to_string(),
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Settings {
    /// Reads every setting from the environment, falling back to defaults.
    ///
    /// # Environment Variables
    ///
    /// - `DETECTOR_BACKEND`: `huggingface` (default) or `lovable`
    /// - `HUGGINGFACE_TOKEN`, `HUGGINGFACE_MODEL_URL`, `HUGGINGFACE_PAYLOAD`
    /// - `LOVABLE_API_KEY`, `LOVABLE_GATEWAY_URL`, `LOVABLE_MODEL`
    /// - `UPSTREAM_TIMEOUT`: humantime duration such as `30s` or `2m`
    /// - `MAX_BODY_BYTES`, `HOST`, `PORT`
    ///
    /// # Errors
    ///
    /// Fails when a variable is set but cannot be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let backend = match non_empty_var("DETECTOR_BACKEND") {
            Some(v) => v.parse()?,
            None => defaults.backend,
        };
        let huggingface_payload = match non_empty_var("HUGGINGFACE_PAYLOAD") {
            Some(v) => v.parse()?,
            None => defaults.huggingface_payload,
        };
        let upstream_timeout = match non_empty_var("UPSTREAM_TIMEOUT") {
            Some(v) => humantime::parse_duration(&v)
                .with_context(|| format!("UPSTREAM_TIMEOUT `{v}` is not a valid duration"))?,
            None => defaults.upstream_timeout,
        };
        let max_body_bytes = match non_empty_var("MAX_BODY_BYTES") {
            Some(v) => v
                .parse()
                .with_context(|| format!("MAX_BODY_BYTES `{v}` is not a byte count"))?,
            None => defaults.max_body_bytes,
        };
        let port = match non_empty_var("PORT") {
            Some(v) => v
                .parse()
                .with_context(|| format!("PORT `{v}` is not a valid port"))?,
            None => defaults.port,
        };

        Ok(Self {
            backend,
            huggingface_token: non_empty_var("HUGGINGFACE_TOKEN"),
            huggingface_model_url: non_empty_var("HUGGINGFACE_MODEL_URL")
                .unwrap_or(defaults.huggingface_model_url),
            huggingface_payload,
            lovable_api_key: non_empty_var("LOVABLE_API_KEY"),
            lovable_gateway_url: non_empty_var("LOVABLE_GATEWAY_URL")
                .unwrap_or(defaults.lovable_gateway_url),
            lovable_model: non_empty_var("LOVABLE_MODEL").unwrap_or(defaults.lovable_model),
            upstream_timeout,
            max_body_bytes,
            host: non_empty_var("HOST").unwrap_or(defaults.host),
            port,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Shared application state for all handlers.
///
/// Holds the resolved [`Settings`] and one pooled HTTP client used for every
/// outbound call. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub http: reqwest::Client,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Builds state from explicit settings.
    ///
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be constructed (TLS backend
    /// initialisation).
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.upstream_timeout)
            .user_agent(concat!("deeptrust/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            settings: Arc::new(settings),
            http,
            started_at: Utc::now(),
        })
    }

    /// Builds state from the process environment.
    ///
    /// ```rust,no_run
    /// use deeptrust_server::AppState;
    ///
    /// fn main() -> anyhow::Result<()> {
    ///     dotenv::dotenv().ok();
    ///     let state = AppState::from_env()?;
    ///     println!("relaying to {}", state.settings.backend);
    ///     Ok(())
    /// }
    /// ```
    pub fn from_env() -> anyhow::Result<Self> {
        Self::new(Settings::from_env()?)
    }
}
