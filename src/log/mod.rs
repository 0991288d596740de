use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

/// Initialize tracing subscriber.
///
/// Behavior:
/// - Log level is read from `APICONTRACT_LOG_LEVEL` if set, otherwise falls back to `RUST_LOG`
///   (via try_from_default_env), then to `info`.
/// - Output format can be set via `APICONTRACT_LOG_FORMAT=json` to enable JSON output. Any other
///   value uses the default human-readable formatter.
///
/// Calling it twice is harmless; the second subscriber is dropped.
pub fn init_tracing() {
    let filter = match std::env::var("APICONTRACT_LOG_LEVEL") {
        Ok(lvl) => EnvFilter::new(lvl),
        Err(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let use_json = std::env::var("APICONTRACT_LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let fmt_layer = if use_json {
        fmt::layer()
            .json()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let subscriber = Registry::default()
        .with(filter)
        .with(fmt_layer)
        .with(ErrorLayer::default());

    // main and the test harness may both initialise; the first subscriber wins
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("global tracing subscriber already installed");
    }
}
