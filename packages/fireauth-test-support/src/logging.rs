//! Test logging bootstrap

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Install a test subscriber once per process.
///
/// Level comes from `TEST_LOG`, then `RUST_LOG`, else `warn`. Set
/// `TEST_LOG_JSON=1` to see events the way the server emits them.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        let builder = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time();

        // Err only means another subscriber won the race
        let _ = if json_requested() {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
    });
}

fn json_requested() -> bool {
    matches!(
        std::env::var("TEST_LOG_JSON").as_deref(),
        Ok("1") | Ok("true")
    )
}
