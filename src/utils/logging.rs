//! Structured logging setup.
//!
//! The library itself only emits `tracing` events. Applications that do not
//! bring their own subscriber can call [`init_logging`] once at startup.

use crate::config::LoggingConfig;
use crate::error::{ProtocolError, Result};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber built from `config`.
///
/// `RUST_LOG` directives take precedence over `config.log_level`. Returns
/// `Ok(false)` when another subscriber was already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<bool> {
    let filter = build_filter(config)?;

    let installed = if config.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
    };

    match installed {
        Ok(()) => {
            tracing::info!(app = %config.app_name, level = %config.log_level, "Logging initialized");
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let level = config.log_level.to_string().to_ascii_lowercase();
    EnvFilter::builder()
        .parse(format!(
            "{level},{}",
            std::env::var("RUST_LOG").unwrap_or_default()
        ))
        .map_err(|e| ProtocolError::ConfigError(format!("Invalid log filter: {e}")))
}
