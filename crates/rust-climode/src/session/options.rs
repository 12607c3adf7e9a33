//! Per-command options.

use std::time::Duration;

use crate::mode::Mode;

/// Which mode a single command runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeOverride {
    /// A mode from the registry.
    Named(String),
    /// A one-off mode, e.g. for a confirmation prompt.
    Inline(Box<Mode>),
}

/// Options for [`CliSession::command_with`](super::CliSession::command_with).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOptions {
    /// Run in this mode instead of the current one.
    pub mode: Option<ModeOverride>,
    /// Forget the strict prompt before sending.
    pub clear_prompt: bool,
    /// Do not append the line terminator.
    pub no_cr: bool,
    /// Exchange timeout.
    pub timeout: Option<Duration>,
}

impl CommandOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run in a registry mode.
    #[must_use]
    pub fn mode(mut self, name: impl Into<String>) -> Self {
        self.mode = Some(ModeOverride::Named(name.into()));
        self
    }

    /// Run in a one-off mode.
    #[must_use]
    pub fn inline_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(ModeOverride::Inline(Box::new(mode)));
        self
    }

    /// Forget the strict prompt.
    #[must_use]
    pub const fn clear_prompt(mut self) -> Self {
        self.clear_prompt = true;
        self
    }

    /// Send the text as is.
    #[must_use]
    pub const fn no_cr(mut self) -> Self {
        self.no_cr = true;
        self
    }

    /// Set the exchange timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the exchange timeout in milliseconds.
    #[must_use]
    pub const fn timeout_ms(self, ms: u64) -> Self {
        self.timeout(Duration::from_millis(ms))
    }
}
