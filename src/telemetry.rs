//! Logging setup shared by both binaries.

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` directives win; `level` is the fallback when it is unset.
/// `format` is `"json"` for one JSON object per line, anything else for
/// human-readable text.
pub fn init(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if format == "json" {
        builder.json().with_current_span(false).init();
    } else {
        builder.init();
    }
}
