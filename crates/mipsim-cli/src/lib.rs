//! Command-line driver library for the mipsim simulator.

#[cfg(test)]
use tempfile as _;
use tracing_subscriber::EnvFilter;

/// Stepping sessions and program listings.
pub mod driver;
/// Per-cycle text reporting.
pub mod report;

pub use driver::{run_session, write_listing, SessionEnd, SessionOptions};
pub use report::ReportOptions;

/// Installs a stderr `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is `debug` with `verbose`
/// and `warn` without. Installing twice is a no-op.
pub fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
