//! Tracing subscriber setup.
//!
//! The engine only emits `tracing` events. Binaries and test harnesses
//! that want to see them call [`init_tracing`] once at startup:
//!
//! ```rust,no_run
//! use rust_climode::config::{LogFormat, LoggingConfig};
//!
//! rust_climode::logging::init_tracing(
//!     &LoggingConfig::new().filter("rust_climode=debug").format(LogFormat::Json),
//! )?;
//! # Ok::<(), rust_climode::CliError>(())
//! ```
//!
//! Driver `debug` calls are logged under the [`SCRIPT_TARGET`] target, so
//! `rust_climode::script=debug` shows them alone.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{CliError, Result};

/// Target of events emitted by driver `debug` calls.
pub const SCRIPT_TARGET: &str = "rust_climode::script";

/// Build the event filter: `RUST_LOG` wins over the configured directive.
///
/// # Errors
///
/// Returns a configuration error if the configured directive is invalid.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter)
        .map_err(|e| CliError::config(format!("invalid log filter '{}': {e}", config.filter)))
}

/// Install a global `fmt` subscriber.
///
/// # Errors
///
/// Returns a configuration error if the filter is invalid or a global
/// subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty().with_target(true))
            .try_init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact().with_target(true))
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init(),
    };
    installed.map_err(|e| CliError::config(format!("tracing subscriber already installed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_directive_is_config_error() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig::new().filter("rust_climode=loud[");
        assert!(build_filter(&config).unwrap_err().is_config());
    }

    #[test]
    fn second_init_fails_cleanly() {
        let config = LoggingConfig::new().filter("warn");
        let first = init_tracing(&config);
        let second = init_tracing(&config);
        assert!(first.is_ok() || first.unwrap_err().is_config());
        assert!(second.unwrap_err().is_config());
    }
}
