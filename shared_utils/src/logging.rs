//! Tracing subscriber setup for the command-line binaries.

use tracing_subscriber::EnvFilter;

/// Installs a formatted tracing subscriber on stderr.
///
/// The filter comes from `RUST_LOG` when set, otherwise `default_directive`
/// (e.g. `"info"`). Calling this twice is harmless; the second install is
/// ignored.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
