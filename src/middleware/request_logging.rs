//! Request logging middleware for HTTP request/response tracking.
//!
//! Every request gets a correlation id and one completion event carrying the
//! method, path, status, duration and body sizes. Request bodies are never
//! logged since they carry image payloads.

use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{CONTENT_LENGTH, HeaderMap, USER_AGENT},
};
use futures::future::{Ready, ok};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Requests slower than this are logged at WARN.
pub const SLOW_REQUEST_MS: u128 = 2000;

/// Request logging middleware.
///
/// Logs:
/// - Request method, path, remote address and user agent
/// - Response status code and timing
/// - Slow requests (above [`SLOW_REQUEST_MS`]) as warnings
#[derive(Clone, Default)]
pub struct RequestLoggingMiddleware;

impl RequestLoggingMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestLoggingMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequestLoggingService { service })
    }
}

/// Request logging service implementation.
pub struct RequestLoggingService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLoggingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();
        let request_id = Uuid::new_v4();

        let method = req.method().to_string();
        let path = req.path().to_string();
        let remote_addr = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();
        let user_agent = req
            .headers()
            .get(USER_AGENT)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        let request_size = content_length(req.headers());

        let fut = self.service.call(req);

        Box::pin(async move {
            let response = fut.await?;
            let duration_ms = start_time.elapsed().as_millis();
            let status_code = response.status().as_u16();
            let response_size = content_length(response.headers());

            match status_code {
                500..=599 => error!(
                    %request_id, %method, %path, status_code, duration_ms,
                    request_size, response_size, %remote_addr, %user_agent,
                    "request failed"
                ),
                400..=499 => warn!(
                    %request_id, %method, %path, status_code, duration_ms,
                    request_size, response_size, %remote_addr, %user_agent,
                    "request rejected"
                ),
                _ => info!(
                    %request_id, %method, %path, status_code, duration_ms,
                    request_size, response_size, %remote_addr, %user_agent,
                    "request completed"
                ),
            }

            if duration_ms > SLOW_REQUEST_MS {
                warn!(
                    %request_id, %method, %path, duration_ms,
                    threshold_ms = SLOW_REQUEST_MS,
                    "Slow request detected"
                );
            }

            Ok(response)
        })
    }
}

fn content_length(headers: &HeaderMap) -> u64 {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0)
}
