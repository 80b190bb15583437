//! Logging setup.

use tracing_subscriber::EnvFilter;

/// Install a stderr fmt subscriber filtered by `log_level`.
///
/// `log_level` accepts anything `EnvFilter` does, from a bare level to full
/// directives like `harmony=debug,info`. An unparseable value falls back to
/// `info`.
pub fn init(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    // A subscriber may already be set when embedded in tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
