//! Tracing initialization for tests and embedding callers.
//!
//! The binary installs its own subscriber in `main`; this initializer is
//! for contexts without one (integration tests, library consumers that
//! just want diagnostics on stderr). Safe to call multiple times.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a default subscriber if none is set. Respects `RUST_LOG`;
/// defaults to debug-level engine events otherwise.
pub fn init() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("jobindex=debug,warn"));

        // try_init so an already-installed subscriber (the binary's, or
        // another test harness's) wins quietly.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_target(true)
            .with_test_writer()
            .compact()
            .try_init();
    });
}
