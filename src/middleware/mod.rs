//! HTTP middleware: CORS decoration and request logging.

pub mod cors;
pub mod request_logging;

pub use cors::Cors;
pub use request_logging::RequestLoggingMiddleware;
