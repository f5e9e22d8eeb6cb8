use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Logs go to stderr so that stdout only
/// carries the deployed addresses.
///
/// `env_filter` uses the `RUST_LOG` syntax, e.g. `info,ico_deploy=debug`.
pub fn initialize(env_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Like [`initialize`], but can be called multiple times in a row. Later calls
/// are ignored.
///
/// Useful for tests.
pub fn initialize_reentrant(env_filter: &str) {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        // another test harness may already own the global subscriber
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(env_filter))
            .with_test_writer()
            .try_init();
    });
}
