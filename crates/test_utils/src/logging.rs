//! Test Logging
//!
//! Installs a `tracing` subscriber once per test binary. Output goes through
//! the test writer so it is captured per test; the filter is read from
//! `RUST_LOG` and defaults to debug output for the catalog crates.

use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,catalog_core=debug,infra_db=debug";

static TRACING: Lazy<()> = Lazy::new(|| {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // Another harness may already have installed a global subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
});

/// Initializes test logging; safe to call from every test
pub fn init_test_tracing() {
    Lazy::force(&TRACING);
}
