//! Logging setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a JSON subscriber writing one line per event to stdout.
///
/// `RUST_LOG` wins when set; otherwise the pruner logs at `info`, or `debug`
/// when `debug` is true.
pub fn init(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("pushgateway_pruner={default_level}").into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(true),
        )
        .init();
}
