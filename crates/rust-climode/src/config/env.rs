//! Environment-based configuration.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{CliError, Result};

/// Environment configuration prefix.
pub const DEFAULT_PREFIX: &str = "CLIMODE";

type Lookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Environment variable reader.
///
/// Values come from a lookup function, the process environment by
/// default. Tests inject a map instead of mutating the environment.
#[derive(Clone)]
pub struct EnvConfig {
    /// Prefix for environment variables.
    prefix: String,
    lookup: Lookup,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl fmt::Debug for EnvConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvConfig")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl EnvConfig {
    /// Create a reader over the process environment.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_lookup(prefix, |name| std::env::var(name).ok())
    }

    /// Create a reader over a custom lookup function.
    #[must_use]
    pub fn with_lookup<F>(prefix: impl Into<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            prefix: prefix.into(),
            lookup: Arc::new(lookup),
        }
    }

    /// Create a reader over fixed `(full name, value)` pairs.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::with_lookup(DEFAULT_PREFIX, move |name| map.get(name).cloned())
    }

    /// Build the full environment variable name.
    fn var_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_uppercase()
        } else {
            format!("{}_{}", self.prefix, name.to_uppercase())
        }
    }

    /// Get a string value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(&self.var_name(name))
    }

    /// Check if a variable is set.
    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Get a parsed value; a value that does not parse is an error.
    pub fn parse<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.get(name)
            .map(|raw| {
                raw.trim().parse::<T>().map_err(|e| {
                    CliError::config(format!("{}='{raw}': {e}", self.var_name(name)))
                })
            })
            .transpose()
    }

    /// Get a boolean value.
    pub fn bool(&self, name: &str) -> Result<Option<bool>> {
        self.get(name)
            .map(|raw| match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" | "enabled" => Ok(true),
                "0" | "false" | "no" | "off" | "disabled" | "" => Ok(false),
                _ => Err(CliError::config(format!(
                    "{}='{raw}' is not a boolean",
                    self.var_name(name)
                ))),
            })
            .transpose()
    }
}

/// Recognised variable names, without the prefix.
pub mod vars {
    /// Hop limit for one macro call.
    pub const MAX_MACRO_HOPS: &str = "MAX_MACRO_HOPS";
    /// Default per-exchange timeout in milliseconds.
    pub const COMMAND_TIMEOUT_MS: &str = "COMMAND_TIMEOUT_MS";
    /// Strip ANSI sequences from command output.
    pub const STRIP_ANSI: &str = "STRIP_ANSI";
    /// Tracing filter directive.
    pub const LOG_FILTER: &str = "LOG_FILTER";
    /// Tracing output format.
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_config_prefix() {
        let config = EnvConfig::new("TEST");
        assert_eq!(config.var_name("foo"), "TEST_FOO");
        assert_eq!(config.var_name("bar_baz"), "TEST_BAR_BAZ");
    }

    #[test]
    fn env_config_no_prefix() {
        let config = EnvConfig::with_lookup("", |_| None);
        assert_eq!(config.var_name("foo"), "FOO");
    }

    #[test]
    fn env_bool_parsing() {
        let config = EnvConfig::from_pairs([
            ("CLIMODE_ENABLED", "true"),
            ("CLIMODE_DISABLED", "off"),
            ("CLIMODE_BROKEN", "maybe"),
        ]);

        assert_eq!(config.bool("ENABLED").unwrap(), Some(true));
        assert_eq!(config.bool("DISABLED").unwrap(), Some(false));
        assert_eq!(config.bool("MISSING").unwrap(), None);
        assert!(config.bool("BROKEN").is_err());
    }

    #[test]
    fn env_parse_numbers() {
        let config = EnvConfig::from_pairs([("CLIMODE_HOPS", " 7 ")]);
        assert_eq!(config.parse::<usize>("hops").unwrap(), Some(7));
        assert!(config.is_set("HOPS"));
        assert!(!config.is_set("OTHER"));
    }
}
