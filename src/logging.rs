//! Structured logging setup on tracing-subscriber.
//!
//! JSON output for production environments, pretty output for
//! development, selected from the `ENVIRONMENT` variable; the filter
//! comes from `RUST_LOG` with an `info` default.

use anyhow::{anyhow, Result};
use std::env;
use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logging (production).
    Json,
    /// Human-readable pretty output (development).
    Pretty,
}

/// Configuration for logging setup.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Filter directive used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("ENV"))
            .unwrap_or_else(|_| "development".to_string());
        let is_production = environment == "production" || environment == "prod";

        Self {
            format: if is_production {
                LogFormat::Json
            } else {
                LogFormat::Pretty
            },
            default_filter: "info".to_string(),
        }
    }
}

/// Install the global subscriber. Fails if one is already set, which in
/// practice means the hosting process initialized logging first; callers
/// embedding this crate can simply skip the call.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter.clone()));

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).try_init(),
    };
    result.map_err(|error| anyhow!("failed to install tracing subscriber: {error}"))
}
