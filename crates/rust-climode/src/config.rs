//! Configuration types for rust-climode.
//!
//! This module defines the engine settings (line terminator, hop limit,
//! default timeout, output cleanup), the logging settings, and the
//! environment and file layers that fill them in.

pub mod env;
pub mod file;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use env::EnvConfig;
pub use file::{ConfigFormat, DriverProfile, ProfileLoader};

use crate::error::{CliError, Result};

/// Line terminator appended to commands.
pub const DEFAULT_LINE_ENDING: &str = "\r";

/// Maximum number of hops in one macro chain.
pub const DEFAULT_MAX_MACRO_HOPS: usize = 10;

/// Default tracing filter directive.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Engine settings shared by every session built from a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Text appended to commands unless `noCr` is set.
    pub line_ending: String,

    /// Hop limit for one top-level macro call.
    pub max_macro_hops: usize,

    /// Per-exchange timeout in milliseconds when nothing more specific is given.
    pub command_timeout: Option<u64>,

    /// Remove ANSI escape sequences from command output.
    pub strip_ansi: bool,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            line_ending: DEFAULT_LINE_ENDING.to_string(),
            max_macro_hops: DEFAULT_MAX_MACRO_HOPS,
            command_timeout: None,
            strip_ansi: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `CLIMODE_*` process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env(&EnvConfig::default())
    }

    /// Set the line terminator.
    #[must_use]
    pub fn line_ending(mut self, line_ending: impl Into<String>) -> Self {
        self.line_ending = line_ending.into();
        self
    }

    /// Set the hop limit.
    #[must_use]
    pub const fn max_macro_hops(mut self, hops: usize) -> Self {
        self.max_macro_hops = hops;
        self
    }

    /// Set the default per-exchange timeout.
    #[must_use]
    pub const fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout.as_millis() as u64);
        self
    }

    /// Enable or disable ANSI stripping.
    #[must_use]
    pub const fn strip_ansi(mut self, strip: bool) -> Self {
        self.strip_ansi = strip;
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// The default timeout as a duration.
    #[must_use]
    pub fn default_timeout(&self) -> Option<Duration> {
        self.command_timeout.map(Duration::from_millis)
    }

    /// Apply environment overrides on top of these values.
    pub fn with_env(mut self, env: &EnvConfig) -> Result<Self> {
        if let Some(hops) = env.parse::<usize>(env::vars::MAX_MACRO_HOPS)? {
            self.max_macro_hops = hops;
        }
        if let Some(ms) = env.parse::<u64>(env::vars::COMMAND_TIMEOUT_MS)? {
            self.command_timeout = Some(ms);
        }
        if let Some(strip) = env.bool(env::vars::STRIP_ANSI)? {
            self.strip_ansi = strip;
        }
        if let Some(filter) = env.get(env::vars::LOG_FILTER) {
            self.logging.filter = filter;
        }
        if let Some(format) = env.parse::<LogFormat>(env::vars::LOG_FORMAT)? {
            self.logging.format = format;
        }
        Ok(self)
    }
}

/// Configuration for logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `rust_climode=debug`.
    pub filter: String,

    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter directive.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Set the log format.
    #[must_use]
    pub const fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Log format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line human readable output.
    Pretty,

    /// Single-line human readable output.
    #[default]
    Compact,

    /// Newline-delimited JSON.
    Json,
}

impl FromStr for LogFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(CliError::config(format!("unknown log format '{other}'"))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pretty => "pretty",
            Self::Compact => "compact",
            Self::Json => "json",
        })
    }
}
