//! Tracing setup shared by the binaries

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over `default_filter`.
///
/// Returns false if a subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}

/// Default filter for a crate at the given level, keeping HTTP tracing quieter.
pub fn default_filter(level: &str) -> String {
    format!("dicebet={level},tower_http=info")
}
