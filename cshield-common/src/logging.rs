//! Tracing subscriber initialisation for the client binaries

use crate::config::LoggingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise `crate_target` is logged at the
/// configured level. Calling this twice is harmless (the second call is a
/// no-op), which keeps integration tests that spin up a binary's `run`
/// function from panicking.
pub fn init(crate_target: &str, logging: &LoggingConfig) {
    let fallback = format!("{}={},cshield_common={}", crate_target, logging.level, logging.level);

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
