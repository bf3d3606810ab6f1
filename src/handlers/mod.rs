//! Handler module organization for the detection relay API.
//!
//! This module wires the analysis, health and upload-page handlers into routes.

pub mod analyze;
pub mod data;
pub mod health;
pub mod ui;

use actix_web::{http::Method, web};

use crate::AppState;

pub use self::{
    analyze::{analyze_image, preflight},
    health::health_check,
    ui::index,
};

/// Registers every route.
///
/// ```text
/// GET     /                    upload page
/// GET     /api/health          liveness probe
/// POST    /api/analyze-image   relay an image to the detector backend
/// OPTIONS /api/analyze-image   CORS preflight
/// ```
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index)).service(
        web::scope("/api")
            .route("/health", web::get().to(health_check))
            .route("/analyze-image", web::post().to(analyze_image))
            .route("/analyze-image", web::method(Method::OPTIONS).to(preflight)),
    );
}

/// Registers shared state, the JSON body limit and all routes.
///
/// # Usage
/// ```rust,no_run
/// use actix_web::App;
/// use deeptrust_server::{AppState, handlers};
///
/// let state = AppState::from_env().expect("config");
/// let app = App::new().configure(handlers::configure_app(state));
/// ```
pub fn configure_app(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let limit = state.settings.max_body_bytes;
        cfg.app_data(web::Data::new(state))
            .app_data(data::json_config(limit));
        configure_routes(cfg);
    }
}
