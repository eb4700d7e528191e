use snafu::ResultExt;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{Result, error::error::LoggingSnafu, settings::LogLevel};

/// Installs the global fmt subscriber. `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(level: LogLevel) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,ais_fetcher={level},kystdatahuset_rs={level},http_client={level}",
            level = level.as_ref()
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .context(LoggingSnafu)
}
