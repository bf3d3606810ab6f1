//! Middleware and auxiliary route tests.
//!
//! Covers CORS decoration (including preflight and error responses), request
//! logging pass-through, the health probe and the upload page.

use actix_web::{App, dev::ServiceResponse, http::StatusCode, test};
use deeptrust_server::{AppState, Backend, Settings, handlers, middleware};
use serde_json::Value;

fn state(backend: Backend) -> AppState {
    AppState::new(Settings {
        backend,
        ..Settings::default()
    })
    .expect("failed to build state")
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(middleware::Cors::new())
                .wrap(middleware::RequestLoggingMiddleware::new())
                .configure(handlers::configure_app($state)),
        )
        .await
    };
}

fn header<'a, B>(resp: &'a ServiceResponse<B>, name: &str) -> Option<&'a str> {
    resp.headers().get(name).and_then(|h| h.to_str().ok())
}

#[actix_web::test]
async fn test_preflight_returns_cors_headers() {
    let app = app!(state(Backend::HuggingFace));

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/analyze-image")
        .insert_header(("origin", "https://deeptrust.example"))
        .insert_header(("access-control-request-method", "POST"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "access-control-allow-origin"), Some("*"));
    assert_eq!(
        header(&resp, "access-control-allow-headers"),
        Some("authorization, x-client-info, apikey, content-type")
    );
    let body = test::read_body(resp).await;
    assert!(body.is_empty());
}

#[actix_web::test]
async fn test_error_responses_carry_cors_headers() {
    let app = app!(state(Backend::HuggingFace));

    let req = test::TestRequest::post()
        .uri("/api/analyze-image")
        .set_json(serde_json::json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&resp, "access-control-allow-origin"), Some("*"));
    assert_eq!(header(&resp, "content-type"), Some("application/json"));
}

#[actix_web::test]
async fn test_health_reports_backend() {
    let app = app!(state(Backend::Lovable));

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "access-control-allow-origin"), Some("*"));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "lovable");
    assert!(body["started_at"].is_string());
    assert!(body["uptime_seconds"].as_i64().unwrap() >= 0);
}

#[actix_web::test]
async fn test_index_serves_upload_page() {
    let app = app!(state(Backend::HuggingFace));

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        header(&resp, "content-type")
            .unwrap_or_default()
            .starts_with("text/html")
    );
    let body = test::read_body(resp).await;
    let html = std::str::from_utf8(&body).unwrap();
    assert!(html.contains("/api/analyze-image"));
}

#[actix_web::test]
async fn test_unknown_route_is_not_found() {
    let app = app!(state(Backend::HuggingFace));

    let req = test::TestRequest::get().uri("/api/nope").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(header(&resp, "access-control-allow-origin"), Some("*"));
}
