//! Logging setup for the `tanc` binary.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Initialize console logging on stderr, keeping stdout for reports.
///
/// Default level is `warn` (`debug` with `verbose`); `RUST_LOG` overrides both.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
