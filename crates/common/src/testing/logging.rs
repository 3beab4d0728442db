//! Tracing setup for tests
//!
//! Honors `RUST_LOG`, writes through the libtest capture writer and ignores
//! the error raised when another test already installed a subscriber.

use tracing_subscriber::EnvFilter;

/// Install a compact fmt subscriber once per test binary.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .compact()
        .try_init();
}
