//! Test logging

use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber filtered by `WARDEN_LOG` (default
/// `warn`). Safe to call from every test.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_env(warden_effects::logging::LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
