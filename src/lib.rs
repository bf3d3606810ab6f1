//! Library entry point for the DeepTrust detection relay.
//!
//! Exports all core modules for use in integration tests and by the main binary.

pub mod detection;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod services;

pub use detection::*;
pub use handlers::data;
pub use logging::*;
pub use models::AppState;
pub use models::*;
pub use services::*;
