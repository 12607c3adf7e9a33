//! Error types for rust-climode.
//!
//! Every failure in the engine is synchronous and carries a message. The
//! variants group failures the way driver authors need to react to them:
//! broken mode definitions, transport failures, mode walks that cannot
//! reach their target, errors printed by the device itself, and bad
//! arguments passed by the calling script.

use std::time::Duration;

use thiserror::Error;

/// Maximum length of buffer content to display in error messages.
const MAX_BUFFER_DISPLAY: usize = 500;

/// Lines kept from the tail of a large buffer.
const TAIL_LINES: usize = 6;

/// Format buffer content for display, truncating if necessary.
fn format_buffer_snippet(buffer: &str) -> String {
    if buffer.is_empty() {
        return "(empty buffer)".to_string();
    }

    if buffer.len() <= MAX_BUFFER_DISPLAY {
        return format!(
            "┌─ buffer ({} bytes) ──────────────────────\n│ {}\n└────────────────────────────────────────",
            buffer.len(),
            buffer.lines().collect::<Vec<_>>().join("\n│ ")
        );
    }

    let lines: Vec<&str> = buffer.lines().collect();
    let tail = &lines[lines.len().saturating_sub(TAIL_LINES)..];
    let hidden = lines.len() - tail.len();

    format!(
        "┌─ buffer ({} bytes, {} lines) ─────────────\n│ ... ({} lines hidden)\n│ {}\n└────────────────────────────────────────",
        buffer.len(),
        lines.len(),
        hidden,
        tail.join("\n│ ")
    )
}

/// Format a transport error, appending the received buffer when known.
fn format_transport_error(context: &str, message: &str, buffer: Option<&String>) -> String {
    match buffer {
        Some(buffer) => format!(
            "{context}: {message}\n\n{}",
            format_buffer_snippet(buffer)
        ),
        None => format!("{context}: {message}"),
    }
}

/// Format a device-reported error like the device printed it.
fn format_device_error(detail: Option<&String>, command: &str) -> String {
    match detail {
        Some(detail) => {
            format!("CLI error returned by the device: '{detail}' after command '{command}'")
        }
        None => format!("CLI error returned by the device after command '{command}'"),
    }
}

/// The main error type for rust-climode operations.
#[derive(Debug, Error)]
pub enum CliError {
    /// A mode, macro or pager definition is missing or malformed.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },

    /// The transport failed to complete an exchange.
    #[error("{}", format_transport_error(context, message, buffer.as_ref()))]
    Transport {
        /// What the engine was doing when the transport failed.
        context: String,
        /// The transport's own description of the failure.
        message: String,
        /// Data received before the failure, if the transport kept it.
        buffer: Option<String>,
    },

    /// The device arrived in a mode flagged as a dead end.
    #[error("in mode {mode}: {message}")]
    ModeFailed {
        /// The dead-end mode.
        mode: String,
        /// The failure message declared by the mode.
        message: String,
    },

    /// A macro chain ended somewhere other than its target.
    #[error(
        "couldn't switch to mode {target} using macro {macro_name} from mode {origin} (reached mode {reached})"
    )]
    ChainExhausted {
        /// The macro the caller asked for.
        macro_name: String,
        /// Mode the session was in when the chain started.
        origin: String,
        /// Mode the chain was supposed to reach.
        target: String,
        /// Mode the session ended up in.
        reached: String,
    },

    /// A macro chain took more hops than allowed.
    #[error("too many steps while switching to a new mode (limit is {limit})")]
    RecursionLimit {
        /// The hop limit that was exceeded.
        limit: usize,
    },

    /// The mode's error pattern matched the device output.
    #[error("{}", format_device_error(detail.as_ref(), command))]
    DeviceReported {
        /// Text captured by the error pattern's first group, if any.
        detail: Option<String>,
        /// The command that triggered the error.
        command: String,
    },

    /// The caller passed an invalid argument.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of what's wrong with the input.
        message: String,
    },

    /// Invalid regex pattern.
    #[error("invalid regex pattern: {0}")]
    Regex(#[from] regex::Error),

    /// An I/O error occurred while reading a profile.
    #[error("{context}: {source}")]
    Io {
        /// What operation was being performed.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A TOML profile could not be parsed.
    #[error("invalid TOML profile: {0}")]
    Toml(#[from] toml::de::Error),

    /// A JSON profile or value could not be parsed.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for rust-climode operations.
pub type Result<T> = std::result::Result<T, CliError>;

impl CliError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a transport error without a buffer.
    pub fn transport(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            context: context.into(),
            message: message.into(),
            buffer: None,
        }
    }

    /// Create a transport error that keeps what was received so far.
    pub fn transport_with_buffer(
        context: impl Into<String>,
        message: impl Into<String>,
        buffer: impl Into<String>,
    ) -> Self {
        Self::Transport {
            context: context.into(),
            message: message.into(),
            buffer: Some(buffer.into()),
        }
    }

    /// Create a transport timeout error.
    pub fn timeout(duration: Option<Duration>, buffer: impl Into<String>) -> Self {
        let message = duration.map_or_else(
            || "timeout waiting for a prompt".to_string(),
            |d| format!("timeout after {d:?} waiting for a prompt"),
        );
        Self::transport_with_buffer("no expected prompt received", message, buffer)
    }

    /// Create a caller-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a device-reported error.
    pub fn device_reported(detail: Option<String>, command: impl Into<String>) -> Self {
        Self::DeviceReported {
            detail,
            command: command.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io_context(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Replace the context of a transport error; other errors pass through.
    #[must_use]
    pub fn with_context(self, context: impl Into<String>) -> Self {
        match self {
            Self::Transport {
                message, buffer, ..
            } => Self::Transport {
                context: context.into(),
                message,
                buffer,
            },
            other => other,
        }
    }

    /// Check if this error comes from a broken definition or profile.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::Regex(_)
                | Self::Toml(_)
                | Self::Json(_)
                | Self::Io { .. }
        )
    }

    /// Check if this is a transport error.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Check if the device itself reported the error.
    #[must_use]
    pub const fn is_device_reported(&self) -> bool {
        matches!(self, Self::DeviceReported { .. })
    }

    /// Check if the caller passed a bad argument.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }

    /// Check if a macro chain failed to reach its target.
    #[must_use]
    pub const fn is_chain_failure(&self) -> bool {
        matches!(
            self,
            Self::ChainExhausted { .. } | Self::RecursionLimit { .. } | Self::ModeFailed { .. }
        )
    }

    /// Get the buffer contents if this error carries them.
    #[must_use]
    pub fn buffer(&self) -> Option<&str> {
        match self {
            Self::Transport { buffer, .. } => buffer.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_error_with_detail() {
        let err = CliError::device_reported(Some("Invalid input".to_string()), "show vresion");
        let msg = err.to_string();
        assert!(msg.contains("'Invalid input'"));
        assert!(msg.contains("after command 'show vresion'"));
        assert!(err.is_device_reported());
    }

    #[test]
    fn device_error_without_detail() {
        let err = CliError::device_reported(None, "show clock");
        assert_eq!(
            err.to_string(),
            "CLI error returned by the device after command 'show clock'"
        );
    }

    #[test]
    fn transport_error_shows_buffer() {
        let err = CliError::timeout(Some(Duration::from_secs(5)), "router1>");
        let msg = err.to_string();
        assert!(msg.contains("timeout after 5s"));
        assert!(msg.contains("router1>"));
        assert_eq!(err.buffer(), Some("router1>"));
        assert!(err.is_transport());
    }

    #[test]
    fn transport_error_without_buffer() {
        let err = CliError::transport("sending command", "connection closed");
        assert_eq!(err.to_string(), "sending command: connection closed");
        assert!(err.buffer().is_none());
    }

    #[test]
    fn with_context_rewrites_transport_only() {
        let err = CliError::transport("send", "closed").with_context("running macro 'enable'");
        assert_eq!(err.to_string(), "running macro 'enable': closed");

        let err = CliError::config("no mode").with_context("ignored");
        assert_eq!(err.to_string(), "configuration error: no mode");
    }

    #[test]
    fn chain_exhausted_message() {
        let err = CliError::ChainExhausted {
            macro_name: "configure".into(),
            origin: "userExec".into(),
            target: "configure".into(),
            reached: "enable".into(),
        };
        assert_eq!(
            err.to_string(),
            "couldn't switch to mode configure using macro configure from mode userExec (reached mode enable)"
        );
        assert!(err.is_chain_failure());
    }

    #[test]
    fn format_buffer_snippet_empty() {
        assert_eq!(format_buffer_snippet(""), "(empty buffer)");
    }

    #[test]
    fn format_buffer_snippet_large() {
        let large: String = (0..80).fold(String::new(), |mut acc, i| {
            use std::fmt::Write;
            let _ = writeln!(acc, "interface GigabitEthernet0/{i}");
            acc
        });
        let snippet = format_buffer_snippet(&large);
        assert!(snippet.contains("lines hidden"));
        assert!(snippet.contains("GigabitEthernet0/79"));
        assert!(!snippet.contains("GigabitEthernet0/10\n"));
    }

    #[test]
    fn config_predicate() {
        assert!(CliError::config("no mode").is_config());
        assert!(!CliError::invalid_input("negative").is_config());
    }
}
