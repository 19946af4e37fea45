//! Diagnostic tracing for the whitelist CLI.
//!
//! Tracing goes to stderr and is controlled by `RUST_LOG`. The acknowledgment
//! printed on stdout is the command's product output and is unaffected.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "warn";

/// Install the stderr subscriber.
///
/// ```bash
/// RUST_LOG=whitelist::io=debug whitelist add 0002a1b2c3 --folder eu --file main.json
/// ```
pub fn init() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::registry()
        .with(filter_from(directives.as_deref()))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

/// Build the filter from raw `RUST_LOG` directives, falling back to
/// [`DEFAULT_FILTER`] when they are missing, blank, or invalid.
fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}
