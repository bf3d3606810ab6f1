//! Main entry point for the DeepTrust detection relay.
//!
//! Sets up the Actix Web server, registers the upload page and the analysis
//! API, and initializes shared application state (settings, HTTP client).
//! Uses dotenv for config and launches the async runtime with structured tracing.

use actix_web::{App, HttpServer};
use deeptrust_server::{AppState, get_subscriber, handlers, init_subscriber, middleware};
use dotenv::dotenv;
use tracing_actix_web::TracingLogger;

/// Main entry point. Configures and runs the Actix Web server.
///
/// - Loads environment variables from `.env`.
/// - Initializes structured tracing (Bunyan JSON on stdout).
/// - Registers all routes with CORS and logging middleware.
/// - Runs until Ctrl-C, then stops gracefully.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let subscriber = get_subscriber("deeptrust".to_string(), "info".to_string(), std::io::stdout);
    init_subscriber(subscriber);

    let app_state = AppState::from_env()?;
    let bind_addr = (app_state.settings.host.clone(), app_state.settings.port);

    tracing::info!(
        backend = %app_state.settings.backend,
        host = %bind_addr.0,
        port = bind_addr.1,
        huggingface_token_set = app_state.settings.huggingface_token.is_some(),
        lovable_key_set = app_state.settings.lovable_api_key.is_some(),
        "starting detection relay"
    );

    let server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Cors::new())
            .wrap(middleware::RequestLoggingMiddleware::new())
            .wrap(TracingLogger::default())
            .configure(handlers::configure_app(app_state.clone()))
    })
    .bind(bind_addr)?
    .run();

    let srv_handle = server.handle();

    let server_task = tokio::spawn(server);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Shutdown signal received");
            srv_handle.stop(true).await;
        }
        res = server_task => {
            match res {
                Ok(Err(e)) => tracing::error!("Server failed: {}", e),
                Err(e) => tracing::error!("Server task failed: {}", e),
                Ok(Ok(())) => {}
            }
        }
    }

    Ok(())
}
