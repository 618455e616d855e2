//! Logging initialisation.
//!
//! `RUST_LOG` wins over the configured level when it is set.

use adaptrade_core::config::LoggingParameters;
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("invalid log filter '{directive}': {reason}")]
    Filter { directive: String, reason: String },

    #[error("a global subscriber is already installed: {0}")]
    AlreadyInstalled(String),
}

/// Build the level filter without installing anything.
pub fn env_filter(params: &LoggingParameters) -> Result<EnvFilter, ObservabilityError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&params.level).map_err(|e| ObservabilityError::Filter {
        directive: params.level.clone(),
        reason: e.to_string(),
    })
}

/// Install the global fmt subscriber. Call once per process.
pub fn init(params: &LoggingParameters) -> Result<(), ObservabilityError> {
    let filter = env_filter(params)?;
    let result = if params.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .try_init()
    };
    result.map_err(|e| ObservabilityError::AlreadyInstalled(e.to_string()))
}
