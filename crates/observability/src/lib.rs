//! Shared logging setup for every latchkey binary.

use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is absent. Pipeline crates log at debug
/// so token revocations and store round-trips show up in development.
const DEFAULT_FILTER: &str = "info,latchkey_auth=debug,latchkey_infra=debug,latchkey_api=debug";

/// Initialize structured JSON logging for the process.
///
/// Honors `RUST_LOG` when set. Safe to call multiple times; subsequent
/// calls become no-ops, which keeps test binaries from fighting over the
/// global subscriber.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .try_init();
}
