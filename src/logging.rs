//! Tracing subscriber setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Errors raised while installing the global subscriber
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {error}")]
    Filter { filter: String, error: String },

    #[error("unknown log format '{0}', expected 'pretty' or 'json'")]
    Format(String),

    #[error("tracing init error: {0}")]
    Init(String),
}

/// Filter directives used when `RUST_LOG` is unset
pub fn default_directives(level: &str) -> String {
    format!("damage_timeline={},tower_http=debug", level)
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directives = default_directives(&config.level);
            EnvFilter::try_new(&directives).map_err(|e| LoggingError::Filter {
                filter: directives,
                error: e.to_string(),
            })?
        }
    };

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format.as_str() {
        "pretty" => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        other => return Err(LoggingError::Format(other.to_string())),
    };

    result.map_err(|e| LoggingError::Init(e.to_string()))
}
