//! tracing-subscriber bootstrap for hosts embedding the traveal crates

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{TravealError, TravealResult};

/// Install a global subscriber. `RUST_LOG` overrides `level` when set.
///
/// `format` is "json" or "text"; anything else is rejected.
pub fn init_logging(level: &str, format: &str) -> TravealResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let result = match format {
        "json" => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init(),
        "text" => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init(),
        other => {
            return Err(TravealError::Config(format!(
                "unknown log format '{other}' (expected json or text)"
            )))
        }
    };

    result.map_err(|e| TravealError::Config(format!("installing tracing subscriber: {e}")))
}

pub fn init_from_config(config: &LoggingConfig) -> TravealResult<()> {
    init_logging(&config.level, &config.format)
}
