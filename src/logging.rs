use anyhow::{Result, anyhow};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Logs go to stderr so command output on stdout
/// stays clean; `RUST_LOG` applies unless `verbose` forces debug.
pub fn enable_logging(verbose: bool) -> Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter_directive(verbose, rust_log.as_deref())))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install logger: {err}"))
}

/// A bare level is scoped to this crate; full directives like `track=trace` pass through.
fn filter_directive(verbose: bool, rust_log: Option<&str>) -> String {
    let crate_name = env!("CARGO_PKG_NAME").replace('-', "_");
    match rust_log.map(str::trim).filter(|value| !value.is_empty()) {
        _ if verbose => format!("{crate_name}={}", LevelFilter::DEBUG),
        Some(directives) if directives.contains('=') => directives.to_string(),
        Some(level) => format!("{crate_name}={level}"),
        None => format!("{crate_name}={}", LevelFilter::WARN),
    }
}

#[cfg(test)]
pub static TEST_LOGGING: std::sync::LazyLock<()> = std::sync::LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .init()
});
