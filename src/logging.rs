//! Application-wide structured logging.
//!
//! Builds a tracing subscriber that writes Bunyan-formatted JSON lines to the
//! given sink, filtered by `RUST_LOG` (or the supplied default), and bridges
//! `log` records emitted by dependencies into the same pipeline.

use tracing::{Subscriber, subscriber::set_global_default};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Registry, fmt::MakeWriter, layer::SubscriberExt};

/// Composes the subscriber without installing it.
///
/// # Parameters
/// - `name`: service name stamped on every log line
/// - `env_filter`: filter used when `RUST_LOG` is unset, e.g. `"info"`
/// - `sink`: where the JSON lines go (`std::io::stdout`, `std::io::sink` in tests)
///
/// # Example
/// ```rust
/// use deeptrust_server::logging::get_subscriber;
///
/// let subscriber = get_subscriber("deeptrust".into(), "info".into(), std::io::sink);
/// # drop(subscriber);
/// ```
pub fn get_subscriber<Sink>(
    name: String,
    env_filter: String,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    let formatting_layer = BunyanFormattingLayer::new(name, sink);

    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

/// Installs `subscriber` as the global default and routes `log` records to it.
///
/// Must be called once per process; a second call is ignored with a warning
/// on stderr.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) {
    if let Err(e) = LogTracer::init() {
        eprintln!("log bridge already installed: {e}");
    }
    if let Err(e) = set_global_default(subscriber) {
        eprintln!("tracing subscriber already installed: {e}");
    }
}
