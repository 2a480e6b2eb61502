//! Shared helpers for the modgraph integration tests.

pub mod builders;
pub mod recording_loader;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test-friendly subscriber once per test binary.
///
/// Output is captured by the harness and only shown for failing tests.
/// `MODGRAPH_LOG` takes the same directives as the binary, e.g.
/// `MODGRAPH_LOG=modgraph::registry=trace cargo test -- --nocapture`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_env("MODGRAPH_LOG")
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Fail the test if `fut` takes longer than five seconds.
pub async fn with_timeout<F: Future>(fut: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), fut)
        .await
        .unwrap_or_else(|_| panic!("timed out after 5s"))
}
