//! Logging setup

use std::sync::Once;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::LoggingConfig;

static TEST_INIT: Once = Once::new();

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing_subscriber(&config.level, config.json, false)
}

/// Initialize test logging with info level (called once per test run)
pub fn init_test_logging() {
    TEST_INIT.call_once(|| {
        let _ = init_tracing_subscriber("info", false, true);
    });
}

fn init_tracing_subscriber(
    level: &str,
    json_output: bool,
    test_writer: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let subscriber = Registry::default().with(env_filter);

    if json_output {
        let json_layer = fmt::layer().json().with_target(true).with_level(true);
        tracing::subscriber::set_global_default(subscriber.with(json_layer))?;
    } else if test_writer {
        let fmt_layer = fmt::layer().with_target(true).with_level(true).with_test_writer();
        tracing::subscriber::set_global_default(subscriber.with(fmt_layer))?;
    } else {
        let fmt_layer = fmt::layer().with_target(true).with_level(true);
        tracing::subscriber::set_global_default(subscriber.with(fmt_layer))?;
    }

    Ok(())
}
