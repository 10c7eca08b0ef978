//! Unified test logging initialization
//!
//! One initialization path for unit tests and integration tests, so every
//! test binary gets the same subscriber configuration.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Initialize structured logging for tests.
///
/// Idempotent and race-safe; calling it from several `#[ctor]` hooks or
/// test bodies is fine. The filter is taken from `TEST_LOG`, then
/// `RUST_LOG`, then falls back to `"warn"`.
///
/// The subscriber uses `with_test_writer()` so cargo captures output per
/// test, and `without_time()` for stable output.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}
