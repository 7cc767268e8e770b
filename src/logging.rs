//! Tracing subscriber setup

use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install a global subscriber once. `RUST_LOG` wins over `filter` when set.
pub fn init_logging(filter: &str, json: bool) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
        let layer = if json {
            fmt::layer().with_target(true).json().with_filter(env_filter).boxed()
        } else {
            fmt::layer().with_target(true).with_filter(env_filter).boxed()
        };
        // Another subscriber (a test harness, an embedding app) may already be set
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("global tracing subscriber already initialized");
        }
        tracing::info!(json, "logging initialized");
    });
}
