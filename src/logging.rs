//! Tracing subscriber setup

use tracing_subscriber::{EnvFilter, fmt};

use crate::config::HelloConfig;

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init(config: &HelloConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = fmt().with_env_filter(filter).with_target(false);

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = match config.log_format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    };
}
