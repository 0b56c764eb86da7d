//! Tracing subscriber setup for the binary.
//!
//! Filter precedence: `EASYHOSTS_LOG`, then `RUST_LOG`, then the config's
//! `log_filter`, then [`DEFAULT_FILTER`]. Output goes to stderr.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "EASYHOSTS_LOG";
pub const DEFAULT_FILTER: &str = "warn,easyhosts=info";

/// Pick the filter directive string.
pub fn filter_directive(configured: Option<&str>) -> String {
    [LOG_ENV, "RUST_LOG"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|v| !v.trim().is_empty())
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(configured: Option<&str>) {
    let directive = filter_directive(configured);
    let env_filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}
