//! Diagnostic logging via `tracing`.
//!
//! Diagnostics go to stderr so they never mix with the action lines or the
//! JSON summary on stdout. `--debug` forces the `debug` level; otherwise the
//! `SORTERA_LOG` environment variable is honored, defaulting to `warn`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "SORTERA_LOG";

/// Builds the filter for the given debug flag.
pub fn build_env_filter(debug: bool) -> EnvFilter {
    if debug {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber has already been installed.
pub fn init_logging(debug: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(debug))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
}
