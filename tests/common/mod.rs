//! Shared helpers for the endpoint tests.
//!
//! [`spawn_fake_upstream`] starts a real actix server on an ephemeral port that
//! plays the part of the Hugging Face inference API, the AI gateway and an
//! image host, so the relay can be exercised end to end without network access.

#![allow(dead_code)]

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use deeptrust_server::{AppState, Backend, HfPayload, Settings};
use serde_json::json;

pub const TEST_TOKEN: &str = "test-token";
/// `hello`, base64-encoded.
pub const HELLO_BASE64: &str = "aGVsbG8=";

/// Starts the fake upstream and returns its base URL.
pub fn spawn_fake_upstream() -> String {
    let server = HttpServer::new(|| {
        App::new()
            .route("/images/cat.png", web::get().to(image_ok))
            .route("/images/missing.png", web::get().to(image_missing))
            .route("/images/large.png", web::get().to(image_large))
            .route("/hf/check", web::post().to(hf_check_binary))
            .route("/hf/json-inputs", web::post().to(hf_check_json))
            .route("/hf/real", web::post().to(hf_real))
            .route("/hf/not-a-list", web::post().to(hf_not_a_list))
            .route("/hf/broken", web::post().to(broken_json))
            .route("/hf/unavailable", web::post().to(hf_unavailable))
            .route("/rate-limited", web::post().to(rate_limited))
            .route("/payment-required", web::post().to(payment_required))
            .route("/gateway/ok", web::post().to(gateway_ok))
            .route("/gateway/garbled", web::post().to(gateway_garbled))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("failed to bind fake upstream");

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{addr}")
}

/// Hugging Face settings pointing at `path` on the fake upstream.
pub fn huggingface_state(base_url: &str, path: &str) -> AppState {
    AppState::new(Settings {
        backend: Backend::HuggingFace,
        huggingface_token: Some(TEST_TOKEN.to_string()),
        huggingface_model_url: format!("{base_url}{path}"),
        ..Settings::default()
    })
    .expect("failed to build state")
}

pub fn huggingface_json_state(base_url: &str, path: &str) -> AppState {
    AppState::new(Settings {
        backend: Backend::HuggingFace,
        huggingface_token: Some(TEST_TOKEN.to_string()),
        huggingface_model_url: format!("{base_url}{path}"),
        huggingface_payload: HfPayload::Json,
        ..Settings::default()
    })
    .expect("failed to build state")
}

/// Gateway settings pointing at `path` on the fake upstream.
pub fn lovable_state(base_url: &str, path: &str) -> AppState {
    AppState::new(Settings {
        backend: Backend::Lovable,
        lovable_api_key: Some(TEST_TOKEN.to_string()),
        lovable_gateway_url: format!("{base_url}{path}"),
        ..Settings::default()
    })
    .expect("failed to build state")
}

fn bearer_ok(req: &HttpRequest) -> bool {
    req.headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        == Some(format!("Bearer {TEST_TOKEN}").as_str())
}

async fn image_ok() -> HttpResponse {
    HttpResponse::Ok().content_type("image/png").body("hello")
}

/// Size of the image served at `/images/large.png`.
pub const LARGE_IMAGE_BYTES: usize = 4096;

async fn image_large() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("image/png")
        .body(vec![0u8; LARGE_IMAGE_BYTES])
}

async fn image_missing() -> HttpResponse {
    HttpResponse::NotFound().finish()
}

/// Accepts only the raw bytes of `hello` with the test token.
async fn hf_check_binary(req: HttpRequest, body: web::Bytes) -> HttpResponse {
    if !bearer_ok(&req) {
        return HttpResponse::Unauthorized().body("bad token");
    }
    if body.as_ref() != b"hello" {
        return HttpResponse::BadRequest().body("unexpected image bytes");
    }
    HttpResponse::Ok().json(json!([
        { "label": "ai_generated", "score": 0.8 },
        { "label": "human", "score": 0.2 }
    ]))
}

/// Accepts only `{"inputs": "<base64 of hello>"}` with the test token.
async fn hf_check_json(req: HttpRequest, body: web::Json<serde_json::Value>) -> HttpResponse {
    if !bearer_ok(&req) {
        return HttpResponse::Unauthorized().body("bad token");
    }
    if body["inputs"] != HELLO_BASE64 {
        return HttpResponse::BadRequest().body("unexpected inputs");
    }
    HttpResponse::Ok().json(json!([{ "label": "fake", "score": 0.6 }]))
}

async fn hf_real() -> HttpResponse {
    HttpResponse::Ok().json(json!([
        { "label": "real", "score": 0.88 },
        { "label": "fake", "score": 0.12 }
    ]))
}

async fn hf_not_a_list() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "warning": "unexpected shape" }))
}

async fn broken_json() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json")
        .body("{ this is not json")
}

async fn hf_unavailable() -> HttpResponse {
    HttpResponse::ServiceUnavailable().json(json!({ "error": "Model is currently loading" }))
}

async fn rate_limited() -> HttpResponse {
    HttpResponse::TooManyRequests().json(json!({ "error": "slow down" }))
}

async fn payment_required() -> HttpResponse {
    HttpResponse::PaymentRequired().json(json!({ "error": "out of credits" }))
}

/// Answers with a fenced JSON verdict when the request is well formed.
async fn gateway_ok(req: HttpRequest, body: web::Json<serde_json::Value>) -> HttpResponse {
    if !bearer_ok(&req) {
        return HttpResponse::Unauthorized().body("bad token");
    }
    let image_url = body["messages"][1]["content"][1]["image_url"]["url"]
        .as_str()
        .unwrap_or_default();
    if image_url.is_empty() || body["model"].as_str().unwrap_or_default().is_empty() {
        return HttpResponse::BadRequest().body("missing image or model");
    }

    let content = "```json\n{\"confidence\": 73, \"verdict\": \"LIKELY_AI\", \"signals\": [{\"name\": \"Texture\", \"detected\": true, \"severity\": \"medium\", \"description\": \"Overly smooth skin\"}], \"summary\": \"Probably generated.\"}\n```";
    HttpResponse::Ok().json(json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    }))
}

async fn gateway_garbled() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "choices": [{ "message": { "role": "assistant", "content": "Sorry, I can't help with that." } }]
    }))
}
