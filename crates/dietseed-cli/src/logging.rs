use tracing_subscriber::EnvFilter;

/// Send `tracing` events to stderr, filtered by `RUST_LOG` or else by the
/// `--log-level` flag.
pub fn init(log_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(std::env::var("RUST_LOG").ok(), log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// A `RUST_LOG` value that does not parse falls back to `log_level`.
fn filter(rust_log: Option<String>, log_level: &str) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(log_level))
}
