//! Logging initialisation
//!
//! Native hosts get a `tracing-subscriber` fmt layer filtered by
//! `WARDEN_LOG` (default `info`); the browser build logs through
//! `tracing-wasm` to the console. Repeated calls are harmless.

/// Environment variable holding the log filter directive
pub const LOG_ENV: &str = "WARDEN_LOG";

/// Install the global subscriber if none is installed yet
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Install the global subscriber if none is installed yet
#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    #[cfg(feature = "web")]
    {
        let _ = tracing_wasm::try_set_as_global_default();
    }
}
